use ledger_smesh::{LedgerSmesh, TransportType};

fn main() {
    #[cfg(feature = "hid")]
    {
        let smesh = LedgerSmesh::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let version = smesh.get_version().expect("failed to get version");
        println!("{version}");
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
