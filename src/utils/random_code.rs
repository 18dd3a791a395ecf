use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成指定长度的随机代码（去除易混淆字符）
pub fn generate_random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_random_code(8).len(), 8);
        assert_eq!(generate_random_code(0).len(), 0);
    }

    #[test]
    fn uses_only_charset_characters() {
        let code = generate_random_code(64);
        assert!(code.bytes().all(|b| CHARSET.contains(&b)));
    }
}
