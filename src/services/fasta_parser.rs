//! FASTA 解析服务 - 业务能力层
//!
//! 只负责把多记录文本拆成 (标签, 序列) 记录，不做任何校验

use crate::models::record::Record;

/// 记录起始标记
pub const RECORD_MARKER: char = '>';

/// 解析 FASTA 文本
///
/// 逐行扫描，只有"无记录"和"记录打开"两种状态：
/// - 空行（去掉首尾空白后）跳过
/// - `>` 开头的行关闭当前记录并打开新记录，标签为空时使用 `seq_<n>`
/// - 其他行去掉空格和制表符后追加到当前记录；第一个 `>` 之前的行被忽略
/// - 序列为空的记录在关闭时直接丢弃
///
/// 序列统一转为大写。没有任何 `>` 的文本返回空列表。
pub fn parse_fasta(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut open: Option<(String, String)> = None;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(header) = line.strip_prefix(RECORD_MARKER) {
            close_record(&mut records, open.take());

            let label = header.trim();
            let label = if label.is_empty() {
                format!("seq_{}", records.len() + 1)
            } else {
                label.to_string()
            };
            open = Some((label, String::new()));
        } else if let Some((_, payload)) = open.as_mut() {
            payload.extend(line.chars().filter(|c| *c != ' ' && *c != '\t'));
        }
    }

    close_record(&mut records, open.take());
    records
}

fn close_record(records: &mut Vec<Record>, open: Option<(String, String)>) {
    if let Some((label, payload)) = open {
        if !payload.is_empty() {
            records.push(Record::new(label, payload.to_uppercase()));
        }
    }
}
