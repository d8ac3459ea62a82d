//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::io::Cursor;

use thumbalizr::Client;

/// Encode a blank JPEG of the given size
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageOutputFormat::Jpeg(80))
}

/// Encode a blank PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageOutputFormat::Png)
}

fn encode(width: u32, height: u32, format: image::ImageOutputFormat) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 200, 200]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}

/// Anonymous client pointed at a mock server
pub fn client(base_url: &str) -> Client {
    Client::builder()
        .base_url(base_url)
        .key("")
        .debug(true)
        .build()
        .expect("Failed to build client")
}
