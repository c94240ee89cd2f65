#![no_main]

use libfuzzer_sys::fuzz_target;
use nb0::{Nb0Read, Nb0Reader};

fuzz_target!(|data: Vec<u8>| {
    let reader = std::io::Cursor::new(data);

    // doesn't crash
    if let Ok(mut archive) = Nb0Reader::from_reader(reader) {
        for entry in &archive.table.entries {
            let _ = archive.reader.extract_data(entry, &mut std::io::sink(), |_, _| ());
        }
    }
});
