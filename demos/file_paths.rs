use std::error::Error;

use moor::FilePathFormat;
use moor::file_path::{file_path_from_url, url_from_file_path};

fn main() -> Result<(), Box<dyn Error>> {
    let url = url_from_file_path(b"/usr/bin/swift", FilePathFormat::Posix)?;
    println!("POSIX -> URL: {}", url.href()); // file:///usr/bin/swift

    let back = file_path_from_url(&url, FilePathFormat::Posix)?;
    println!("URL -> POSIX: {}", String::from_utf8_lossy(&back)); // /usr/bin/swift

    let url = url_from_file_path(br"\\server\share\doc.txt", FilePathFormat::Windows)?;
    println!("UNC -> URL: {}", url.href()); // file://server/share/doc.txt

    Ok(())
}
