use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;

use deku::DekuContainerWrite;
use nb0::{Extraction, FileEntryHeader, Nb0Error, Nb0Read, Nb0Reader};
use tempfile::tempdir;

/// Build container bytes from `(name, data)` pairs, packed in order
fn build(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut bytes = (files.len() as u32).to_le_bytes().to_vec();
    let mut offset = 0;
    for (name, data) in files {
        let header = FileEntryHeader::new(name, offset, data.len() as u64).unwrap();
        bytes.extend(header.to_bytes().unwrap());
        offset += data.len() as u64;
    }
    for (_, data) in files {
        bytes.extend_from_slice(data);
    }
    bytes
}

fn extract_all(archive: &mut Nb0Reader, out_dir: &Path) -> Vec<Extraction> {
    let mut extractions = vec![];
    for entry in &archive.table.entries {
        extractions.push(archive.reader.extract_to_dir(entry, out_dir, |_, _| ()).unwrap());
    }
    extractions
}

#[test_log::test]
fn test_extract_two_entries() {
    let a: &[u8] = b"0123456789";
    let bytes = build(&[("a.bin", a), ("b.bin", b"")]);
    assert_eq!(bytes.len(), 4 + 2 * 64 + 10);

    let tmp = tempdir().unwrap();
    let nb0_path = tmp.path().join("firmware.nb0");
    fs::write(&nb0_path, &bytes).unwrap();
    let out_dir = tmp.path().join("outdir");
    fs::create_dir(&out_dir).unwrap();

    let mut archive = Nb0Reader::from_reader(File::open(&nb0_path).unwrap()).unwrap();
    assert_eq!(archive.table.file_count, 2);
    assert_eq!(archive.table.entries[0].data_offset, 4 + 2 * 64);
    assert_eq!(archive.table.entries[1].file_size, 0);

    let extractions = extract_all(&mut archive, &out_dir);
    assert_eq!(extractions, [Extraction::Written, Extraction::Empty]);

    assert_eq!(fs::read(out_dir.join("a.bin")).unwrap(), a);
    assert!(!out_dir.join("b.bin").exists());
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);
}

#[test_log::test]
fn test_extract_matches_source_range() {
    let system: Vec<u8> = (0..10_000).map(|i| (i * 7) as u8).collect();
    let boot: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
    let bytes = build(&[("system.img", &system), ("boot.img", &boot), ("pad", &[0xff])]);

    let tmp = tempdir().unwrap();
    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes.clone())).unwrap();
    extract_all(&mut archive, tmp.path());

    for entry in &archive.table.entries {
        let start = entry.data_offset as usize;
        let end = start + entry.file_size as usize;
        let out = fs::read(tmp.path().join(&entry.name)).unwrap();
        assert_eq!(out.len() as u64, entry.file_size);
        assert_eq!(out, &bytes[start..end]);
    }
}

#[test_log::test]
fn test_extract_twice() {
    let bytes = build(&[("a", b"aaaa"), ("b", b""), ("c", b"cc")]);
    let tmp = tempdir().unwrap();

    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();
    let first = extract_all(&mut archive, tmp.path());
    assert_eq!(first, [Extraction::Written, Extraction::Empty, Extraction::Written]);
    let a = fs::read(tmp.path().join("a")).unwrap();

    let second = extract_all(&mut archive, tmp.path());
    assert_eq!(second, [Extraction::Duplicate, Extraction::Empty, Extraction::Duplicate]);
    assert_eq!(fs::read(tmp.path().join("a")).unwrap(), a);
    assert_eq!(fs::read(tmp.path().join("c")).unwrap(), b"cc");
}

#[test_log::test]
fn test_duplicate_is_size_only() {
    let bytes = build(&[("a", b"aaaa")]);
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("a");

    // same size, different content: left alone
    fs::write(&path, b"zzzz").unwrap();
    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();
    assert_eq!(extract_all(&mut archive, tmp.path()), [Extraction::Duplicate]);
    assert_eq!(fs::read(&path).unwrap(), b"zzzz");

    // different size: overwritten
    fs::write(&path, b"zzzzzz").unwrap();
    assert_eq!(extract_all(&mut archive, tmp.path()), [Extraction::Written]);
    assert_eq!(fs::read(&path).unwrap(), b"aaaa");
}

#[test_log::test]
fn test_not_nb0() {
    let mut bytes = build(&[("a", b"aaaa"), ("b", b"bb")]);
    bytes.push(0);

    let err = Nb0Reader::from_reader(Cursor::new(bytes)).err().unwrap();
    assert!(matches!(err, Nb0Error::Format { expected: 138, actual: 139 }));
}

#[test_log::test]
fn test_hi_words() {
    // size > 4GiB, only the table is read so no data is needed
    let header = FileEntryHeader::new("userdata.img", 0, 1 << 32).unwrap();
    assert_eq!((header.hi_file_size, header.lo_file_size), (1, 0));
    assert_eq!((header.hi_data_offset, header.lo_data_offset), (0, 0));
    let mut bytes = 1_u32.to_le_bytes().to_vec();
    bytes.extend(header.to_bytes().unwrap());

    let table = nb0::HeaderTable::from_reader(&mut Cursor::new(&bytes)).unwrap();
    let entry = &table.entries[0];
    assert_eq!(entry.name, "userdata.img");
    assert_eq!(entry.file_size, 4294967296);
    assert_eq!(entry.data_offset, table.header_table_end);
    assert!(matches!(
        table.validate(bytes.len() as u64),
        Err(Nb0Error::Format { expected: 4294967364, .. })
    ));
}

#[test_log::test]
fn test_truncated_payload() {
    let bytes = build(&[("a", b"aaaa")]);
    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();

    // entry claims more data than the reader has left
    let mut entry = archive.table.entries[0].clone();
    entry.file_size = 10;

    let tmp = tempdir().unwrap();
    let err = archive.reader.extract_to_dir(&entry, tmp.path(), |_, _| ()).unwrap_err();
    assert!(matches!(err, Nb0Error::Truncated { remaining: 6, .. }));
    // partial output is kept, up to the end of the container
    assert_eq!(fs::read(tmp.path().join("a")).unwrap(), b"aaaa");
}

#[test_log::test]
fn test_unsafe_name() {
    let bytes = build(&[("../escape", b"data")]);
    let tmp = tempdir().unwrap();
    let out_dir = tmp.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();
    let entry = archive.table.entries[0].clone();
    let err = archive.reader.extract_to_dir(&entry, &out_dir, |_, _| ()).unwrap_err();
    assert!(matches!(err, Nb0Error::UnsafeName(name) if name == "../escape"));
    assert!(!tmp.path().join("escape").exists());
}

#[test_log::test]
fn test_write_error() {
    let bytes = build(&[("a", b"aaaa")]);
    let tmp = tempdir().unwrap();
    // directory where the file should go
    fs::create_dir(tmp.path().join("a")).unwrap();

    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();
    let entry = archive.table.entries[0].clone();
    let err = archive.reader.extract_to_dir(&entry, tmp.path(), |_, _| ()).unwrap_err();
    assert!(matches!(err, Nb0Error::Write { path, .. } if path == tmp.path().join("a")));
}

#[test_log::test]
fn test_extract_by_name() {
    let bytes = build(&[("a", b"aaaa"), ("modem.img", b"modem data")]);
    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();

    let mut out: Vec<u8> = vec![];
    let entry = archive.extract_by_name("modem.img", &mut out).unwrap().unwrap();
    assert_eq!(entry.file_size, 10);
    assert_eq!(out, b"modem data");

    let mut out: Vec<u8> = vec![];
    assert!(archive.extract_by_name("missing", &mut out).unwrap().is_none());
    assert!(out.is_empty());
}

#[test_log::test]
fn test_progress() {
    let data = vec![1_u8; 10_000];
    let bytes = build(&[("big", &data)]);
    let mut archive = Nb0Reader::from_reader(Cursor::new(bytes)).unwrap();

    let entry = archive.table.entries[0].clone();
    let mut percents = vec![];
    let mut out: Vec<u8> = vec![];
    archive
        .reader
        .extract_data(&entry, &mut out, |written, total| percents.push(written * 100 / total))
        .unwrap();
    assert_eq!(percents, [40, 81, 100]);
    assert_eq!(out, data);
}
