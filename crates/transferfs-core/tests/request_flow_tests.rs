// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end request flows through the public API, the way a protocol
//! dispatcher drives a backend.

use transferfs_core::{FsError, MemFs};
use transferfs_proto::{validate_request, FileAttributes, Request};

fn run(fs: &MemFs, request: &Request) {
    validate_request(request).expect("request should validate");
    fs.run_command(request).expect("command should succeed");
}

#[test]
fn test_full_session() {
    let fs = MemFs::new();

    // Create a directory and upload a file into it
    run(&fs, &Request::mkdir("/a"));
    let upload = Request::put("/a/f");
    validate_request(&upload).unwrap();
    let writer = fs.open_write(&upload).expect("open for write should succeed");
    writer.write_at(b"hello", 0).unwrap();

    // The listing shows the file with its size
    let listing = fs.list(&Request::list("/a")).expect("list should succeed");
    assert_eq!(listing.len(), 1);
    assert_eq!(listing.entries()[0].name, "f");
    assert_eq!(listing.entries()[0].len, 5);

    // Random-access download of a byte range
    let reader = fs.open_read(&Request::get("/a/f")).expect("open for read should succeed");
    let mut buf = [0u8; 3];
    assert_eq!(reader.read_at(&mut buf, 1).unwrap(), 3);
    assert_eq!(&buf, b"ell");

    // Rename the directory and verify the file moved with it
    run(&fs, &Request::rename("/a", "/b"));
    let listing = fs.list(&Request::list("/b")).expect("list should succeed");
    assert_eq!(listing.entries()[0].name, "f");
    assert_eq!(fs.open_read(&Request::get("/a/f")).err(), Some(FsError::NotFound));

    // Tear everything down
    run(&fs, &Request::remove("/b/f"));
    run(&fs, &Request::rmdir("/b"));
    assert!(fs.list(&Request::list("/")).unwrap().is_empty());
}

#[test]
fn test_directory_download_pagination() {
    let fs = MemFs::new();
    fs.run_command(&Request::mkdir("/bulk")).unwrap();
    for i in 0..5 {
        let writer = fs.open_write(&Request::put(format!("/bulk/{i:02}"))).unwrap();
        writer.write_at(b"x", 0).unwrap();
    }

    // Page through the listing the way READDIR loops do
    let listing = fs.list(&Request::list("/bulk")).unwrap();
    let mut collected = Vec::new();
    let mut offset = 0u64;
    loop {
        match listing.read_at(offset, 2) {
            Ok(page) => {
                offset += page.len() as u64;
                collected.extend(page.iter().map(|info| info.name.clone()));
            }
            Err(FsError::EndOfFile) => break,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(collected, ["00", "01", "02", "03", "04"]);
}

#[test]
fn test_resumed_upload_after_truncate() {
    let fs = MemFs::new();

    let writer = fs.open_write(&Request::put("/upload.bin")).unwrap();
    writer.write_at(b"0123456789", 0).unwrap();

    // A client restarts the transfer from a smaller offset
    let request = Request::setstat("/upload.bin", FileAttributes::with_size(4));
    run(&fs, &request);
    writer.write_at(b"AB", 4).unwrap();

    let reader = fs.open_read(&Request::get("/upload.bin")).unwrap();
    let mut buf = [0u8; 6];
    assert_eq!(reader.read_at(&mut buf, 0).unwrap(), 6);
    assert_eq!(&buf, b"0123AB");

    // Reading past the shortened end reports EOF
    assert_eq!(reader.read_at(&mut buf, 6), Err(FsError::EndOfFile));
}

#[test]
fn test_injected_failure_recorded_on_handle() {
    let fs = MemFs::new();
    let writer = fs.open_write(&Request::put("/wip")).unwrap();

    // The dispatcher reports a mid-transfer failure on the handle before
    // closing it, leaving a diagnostic for later inspection
    fs.faults().set(FsError::Injected("connection reset".to_string()));
    let failed = fs.open_read(&Request::get("/wip")).unwrap_err();
    writer.record_transfer_error(failed.clone());

    assert_eq!(writer.last_transfer_error(), Some(failed));
    fs.faults().clear();
    assert!(fs.open_read(&Request::get("/wip")).is_ok());
}
