//! 氨基酸字母表
//!
//! 序列字母表与长度规则只在这里定义一次，校验服务和存储层都复用它

use phf::phf_map;

/// 持久化字段允许的最大序列长度（残基数）
pub const MAX_SEQUENCE_LENGTH: usize = 130;

/// 20 种标准氨基酸的单字母代码（按字母顺序）
pub const ALPHABET: &str = "ACDEFGHIKLMNPQRSTVWY";

static AMINO_ACIDS: phf::Map<char, &'static str> = phf_map! {
    'A' => "Alanine",
    'C' => "Cysteine",
    'D' => "Aspartic acid",
    'E' => "Glutamic acid",
    'F' => "Phenylalanine",
    'G' => "Glycine",
    'H' => "Histidine",
    'I' => "Isoleucine",
    'K' => "Lysine",
    'L' => "Leucine",
    'M' => "Methionine",
    'N' => "Asparagine",
    'P' => "Proline",
    'Q' => "Glutamine",
    'R' => "Arginine",
    'S' => "Serine",
    'T' => "Threonine",
    'V' => "Valine",
    'W' => "Tryptophan",
    'Y' => "Tyrosine",
};

/// 是否为标准氨基酸字母（区分大小写，只接受大写）
pub fn is_amino_acid(c: char) -> bool {
    AMINO_ACIDS.contains_key(&c)
}

/// 获取氨基酸全称
pub fn name_of(c: char) -> Option<&'static str> {
    AMINO_ACIDS.get(&c).copied()
}

/// 序列中第一个不属于字母表的字符
pub fn first_invalid(sequence: &str) -> Option<char> {
    sequence.chars().find(|c| !is_amino_acid(*c))
}

/// 单条序列的结构问题
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceViolation {
    /// 序列为空
    Empty,
    /// 超出长度上限
    TooLong { length: usize, max: usize },
    /// 含有字母表之外的字符
    InvalidCharacter(char),
}

/// 按 空 → 长度 → 字母表 的顺序检查序列，遇到第一个问题即返回
pub fn check_sequence(sequence: &str, max_length: usize) -> Result<(), SequenceViolation> {
    if sequence.is_empty() {
        return Err(SequenceViolation::Empty);
    }

    let length = sequence.chars().count();
    if length > max_length {
        return Err(SequenceViolation::TooLong {
            length,
            max: max_length,
        });
    }

    match first_invalid(sequence) {
        Some(c) => Err(SequenceViolation::InvalidCharacter(c)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_matches_table() {
        assert_eq!(ALPHABET.len(), 20);
        assert!(ALPHABET.chars().all(is_amino_acid));
        assert_eq!(AMINO_ACIDS.len(), 20);
    }

    #[test]
    fn test_non_standard_letters_rejected() {
        for c in ['B', 'J', 'O', 'U', 'X', 'Z', 'a', '*', '-'] {
            assert!(!is_amino_acid(c), "{c} 不应属于字母表");
        }
    }

    #[test]
    fn test_name_of() {
        assert_eq!(name_of('W'), Some("Tryptophan"));
        assert_eq!(name_of('B'), None);
    }

    #[test]
    fn test_check_sequence_order() {
        assert_eq!(check_sequence("", 130), Err(SequenceViolation::Empty));

        // 长度检查先于字母表检查
        let long_and_invalid = "B".repeat(131);
        assert_eq!(
            check_sequence(&long_and_invalid, 130),
            Err(SequenceViolation::TooLong {
                length: 131,
                max: 130
            })
        );

        assert_eq!(
            check_sequence("ACDEFGHIKLMNPQRSTVWYB", 130),
            Err(SequenceViolation::InvalidCharacter('B'))
        );
        assert_eq!(check_sequence(ALPHABET, 130), Ok(()));
        assert_eq!(check_sequence(&"A".repeat(130), 130), Ok(()));
    }
}
