use ledger_smesh::{Bip32Path, LedgerSmesh, TransportType};

fn main() {
    #[cfg(feature = "hid")]
    {
        let smesh = LedgerSmesh::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let path = Bip32Path::smesh(0, 0);
        let xpub = smesh
            .get_extended_public_key(&path)
            .expect("failed to get extended public key");
        println!("path: {path}");
        println!("xpub: {xpub}");
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
