use ledger_smesh::{codec, Bip32Path, LedgerSmesh, TransportType};

fn main() {
    #[cfg(feature = "hid")]
    {
        let tx_hex = std::env::args().nth(1).unwrap_or_else(|| {
            eprintln!("usage: sign <tx-hex>");
            std::process::exit(2);
        });
        let tx = codec::hex_to_bytes(&tx_hex).expect("bad tx hex");

        let smesh = LedgerSmesh::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let path = Bip32Path::smesh(0, 0);
        let signed = smesh.sign_tx(&path, &tx).expect("signing failed");
        println!("signature: {}", codec::bytes_to_hex(&signed.signature));
        println!("signed tx: {}", codec::bytes_to_hex(signed.as_bytes()));
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
