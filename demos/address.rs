use ledger_smesh::{Bip32Path, LedgerSmesh, TransportType};

fn main() {
    #[cfg(feature = "hid")]
    {
        let smesh = LedgerSmesh::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let path: Bip32Path = "44'/540'/0'/0/0".parse().expect("bad path");
        let address = smesh.get_address(&path).expect("failed to get address");
        println!("path:    {path}");
        println!("address: {address}");

        println!("confirm the same address on the device...");
        smesh.show_address(&path).expect("address not confirmed");
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
