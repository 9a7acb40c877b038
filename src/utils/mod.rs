pub mod hash;
pub mod html;
pub mod ip;
pub mod url_validator;

pub use hash::{canonical_json, content_hash};
pub use url_validator::{UrlValidationError, validate_url};

/// 短码长度范围
pub const MIN_CODE_LEN: usize = 3;
pub const MAX_CODE_LEN: usize = 20;

/// 随机短码默认长度
pub const RANDOM_CODE_LEN: usize = 6;

/// 短码格式：3–20 位，仅允许字母、数字、`-`、`_`
#[inline]
pub fn is_valid_short_code(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// 短码统一小写存储，实现大小写不敏感的唯一性
#[inline]
pub fn normalize_short_code(code: &str) -> String {
    code.to_ascii_lowercase()
}

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 只用小写字母和数字，生成后无需再规范化
    let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}
