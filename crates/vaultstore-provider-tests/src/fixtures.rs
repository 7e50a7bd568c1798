use rand::RngCore;
use rand::distr::{Alphanumeric, SampleString};

/// Random binary payload of `size` bytes.
pub fn payload(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::rng().fill_bytes(&mut buf);
    buf
}

/// Random printable secret, as a password or token would be.
pub fn text_payload(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

/// Binary payload that is guaranteed not to be valid UTF-8.
pub fn binary_payload() -> Vec<u8> {
    let mut buf = payload(64);
    buf[0] = 0xff;
    buf
}
