//! 花名册解析与归一化
//!
//! 把上传的表格（xlsx 或 csv）还原成有序的行序列，再归一化为
//! (团队, 学生) 记录：团队列支持 fill-down 继承，列名大小写与拼写
//! 变体按固定优先级解析，重复学号保留最后一次出现。

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Reader, Xlsx};
use uuid::Uuid;

/// 原始行：按列顺序保存 (表头, 单元格文本)
pub type RawRow = Vec<(String, String)>;

/// 团队列候选名，按优先级排列
const TEAM_COLUMNS: [&str; 3] = ["team_id", "team", "team name"];
/// 姓名列候选名
const NAME_COLUMNS: [&str; 2] = ["name", "student name"];
/// 学号列候选名
const ID_COLUMNS: [&str; 4] = ["student_id", "id", "sl no.", "sl no"];

/// 无团队列可用时的兜底团队名
const UNASSIGNED_TEAM: &str = "Unassigned";

/// 花名册解析失败
#[derive(Debug)]
pub enum RosterError {
    /// 文件无法解析为表格
    ParseFailed(String),
    /// 花名册没有数据行
    EmptyRoster,
    /// 所有行都没有姓名列
    MissingNameColumn,
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::ParseFailed(msg) => write!(f, "花名册解析失败: {msg}"),
            RosterError::EmptyRoster => write!(f, "花名册中没有数据行"),
            RosterError::MissingNameColumn => {
                write!(f, "花名册缺少姓名列（name / student name）")
            }
        }
    }
}

impl std::error::Error for RosterError {}

/// 归一化后的学生记录，团队尚未落库，以名称指代
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStudent {
    pub team_name: String,
    pub student_id: String,
    pub name: String,
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// 归一化结果
#[derive(Debug, Clone)]
pub struct NormalizedRoster {
    /// 出现顺序去重后的团队名
    pub team_names: Vec<String>,
    /// (team_name, student_id) 已去重，保留最后一次出现
    pub students: Vec<NormalizedStudent>,
}

/// 解析上传的花名册文件，扩展名为 .xlsx 走 calamine，其余按 CSV 处理
pub fn parse_roster(data: &[u8], file_name: &str) -> Result<Vec<RawRow>, RosterError> {
    if file_name.to_lowercase().ends_with(".xlsx") {
        parse_xlsx(data)
    } else {
        parse_csv(data)
    }
}

fn parse_xlsx(data: &[u8]) -> Result<Vec<RawRow>, RosterError> {
    let cursor = Cursor::new(data);
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| RosterError::ParseFailed(format!("打开 XLSX 失败: {e}")))?;

    // 只读第一个工作表
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| RosterError::ParseFailed("工作簿中没有工作表".to_string()))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| RosterError::ParseFailed(format!("读取工作表失败: {e}")))?;

    let mut rows_iter = range.rows();
    let header_row = match rows_iter.next() {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut raw: RawRow = Vec::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let value = row.get(index).map(|c| c.to_string()).unwrap_or_default();
            raw.push((header.clone(), value));
        }
        rows.push(raw);
    }

    Ok(rows)
}

fn parse_csv(data: &[u8]) -> Result<Vec<RawRow>, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| RosterError::ParseFailed(format!("读取表头失败: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_num, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| RosterError::ParseFailed(format!("第 {} 行解析失败: {e}", row_num + 2)))?;
        let mut raw: RawRow = Vec::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let value = record.get(index).unwrap_or("").to_string();
            raw.push((header.clone(), value));
        }
        rows.push(raw);
    }

    Ok(rows)
}

/// 按候选列名（大小写不敏感）取第一个非空值
fn resolve_field(row: &RawRow, candidates: &[&str]) -> Option<String> {
    for candidate in candidates {
        for (header, value) in row {
            if header.trim().eq_ignore_ascii_case(candidate) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// 行的键集合（大小写不敏感）中是否存在候选列
fn has_column(row: &RawRow, candidates: &[&str]) -> bool {
    row.iter().any(|(header, _)| {
        candidates
            .iter()
            .any(|c| header.trim().eq_ignore_ascii_case(c))
    })
}

/// 归一化花名册行
///
/// 团队 fill-down 在姓名过滤之前、对未过滤的完整序列计算：空姓名的行
/// 被丢弃，但它携带的团队值仍会传递给后续行。
pub fn normalize(rows: &[RawRow]) -> Result<NormalizedRoster, RosterError> {
    if rows.is_empty() {
        return Err(RosterError::EmptyRoster);
    }

    if !rows.iter().any(|row| has_column(row, &NAME_COLUMNS)) {
        return Err(RosterError::MissingNameColumn);
    }

    // 第一遍：对完整序列做团队 fill-down
    let mut current_team = UNASSIGNED_TEAM.to_string();
    let mut resolved_teams = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(team) = resolve_field(row, &TEAM_COLUMNS) {
            current_team = team;
        }
        resolved_teams.push(current_team.clone());
    }

    // 第二遍：过滤空姓名行，构建学生候选
    let mut team_names: Vec<String> = Vec::new();
    let mut students: Vec<NormalizedStudent> = Vec::new();
    // (team_name, student_id) -> students 中的下标
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for (row, team_name) in rows.iter().zip(resolved_teams.iter()) {
        let name = match resolve_field(row, &NAME_COLUMNS) {
            Some(name) => name,
            None => continue,
        };

        // 学号列缺失时合成随机标识，仅在本次导入内稳定
        let student_id = resolve_field(row, &ID_COLUMNS)
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        if !team_names.contains(team_name) {
            team_names.push(team_name.clone());
        }

        let mut details = serde_json::Map::new();
        for (header, value) in row {
            details.insert(
                header.clone(),
                serde_json::Value::String(value.clone()),
            );
        }

        let student = NormalizedStudent {
            team_name: team_name.clone(),
            student_id: student_id.clone(),
            name,
            details,
        };

        // 重复键保留最后一次出现
        let key = (team_name.clone(), student_id);
        match seen.get(&key) {
            Some(index) => students[*index] = student,
            None => {
                seen.insert(key, students.len());
                students.push(student);
            }
        }
    }

    Ok(NormalizedRoster {
        team_names,
        students,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert!(matches!(normalize(&[]), Err(RosterError::EmptyRoster)));
    }

    #[test]
    fn missing_name_column_is_rejected() {
        let rows = vec![row(&[("team", "Red"), ("sl no.", "1")])];
        assert!(matches!(
            normalize(&rows),
            Err(RosterError::MissingNameColumn)
        ));
    }

    #[test]
    fn fill_down_inherits_nearest_preceding_team() {
        let rows = vec![
            row(&[("name", "Alice"), ("team", "Red")]),
            row(&[("name", "Bob"), ("team", "")]),
            row(&[("name", "Carol"), ("team", "Blue")]),
            row(&[("name", "Dave"), ("team", "")]),
        ];
        let roster = normalize(&rows).unwrap();
        let teams: Vec<&str> = roster
            .students
            .iter()
            .map(|s| s.team_name.as_str())
            .collect();
        assert_eq!(teams, vec!["Red", "Red", "Blue", "Blue"]);
    }

    #[test]
    fn no_team_column_anywhere_assigns_unassigned() {
        let rows = vec![row(&[("name", "Alice")]), row(&[("name", "Bob")])];
        let roster = normalize(&rows).unwrap();
        assert!(roster.students.iter().all(|s| s.team_name == "Unassigned"));
        assert_eq!(roster.team_names, vec!["Unassigned"]);
    }

    #[test]
    fn dropped_blank_name_row_still_updates_fill_down() {
        // Alice/Red, Bob 继承 Red；空姓名行被丢弃但把团队切到 Blue，
        // 所以 Carol 归 Blue 而不是 Red
        let rows = vec![
            row(&[("name", "Alice"), ("team", "Red")]),
            row(&[("name", "Bob")]),
            row(&[("name", ""), ("team", "Blue")]),
            row(&[("name", "Carol"), ("team", "Blue")]),
        ];
        let roster = normalize(&rows).unwrap();
        assert_eq!(roster.students.len(), 3);
        assert_eq!(roster.students[0].team_name, "Red");
        assert_eq!(roster.students[1].team_name, "Red");
        assert_eq!(roster.students[2].name, "Carol");
        assert_eq!(roster.students[2].team_name, "Blue");
    }

    #[test]
    fn column_name_variants_are_case_insensitive() {
        let rows = vec![
            row(&[("Student Name", "Alice"), ("TEAM", "Red"), ("Sl No.", "1")]),
            row(&[("Student Name", "Bob"), ("Team Name", "Blue"), ("Sl No.", "2")]),
        ];
        let roster = normalize(&rows).unwrap();
        assert_eq!(roster.students[0].name, "Alice");
        assert_eq!(roster.students[0].team_name, "Red");
        assert_eq!(roster.students[0].student_id, "1");
        assert_eq!(roster.students[1].team_name, "Blue");
    }

    #[test]
    fn team_id_column_takes_priority_over_team() {
        let rows = vec![row(&[
            ("name", "Alice"),
            ("team", "Fallback"),
            ("team_id", "Primary"),
        ])];
        let roster = normalize(&rows).unwrap();
        assert_eq!(roster.students[0].team_name, "Primary");
    }

    #[test]
    fn missing_identifier_synthesizes_one() {
        let rows = vec![
            row(&[("name", "Alice"), ("team", "Red")]),
            row(&[("name", "Bob"), ("team", "Red")]),
        ];
        let roster = normalize(&rows).unwrap();
        assert!(!roster.students[0].student_id.is_empty());
        assert_ne!(
            roster.students[0].student_id,
            roster.students[1].student_id
        );
    }

    #[test]
    fn duplicate_key_keeps_last_occurrence() {
        let rows = vec![
            row(&[("name", "Alice v1"), ("team", "Red"), ("id", "7")]),
            row(&[("name", "Bob"), ("team", "Red"), ("id", "8")]),
            row(&[("name", "Alice v2"), ("team", "Red"), ("id", "7")]),
        ];
        let roster = normalize(&rows).unwrap();
        assert_eq!(roster.students.len(), 2);
        assert_eq!(roster.students[0].name, "Alice v2");
        assert_eq!(roster.students[0].student_id, "7");
    }

    #[test]
    fn details_preserve_original_row() {
        let rows = vec![row(&[
            ("name", "Alice"),
            ("team", "Red"),
            ("email", "alice@example.com"),
        ])];
        let roster = normalize(&rows).unwrap();
        let details = &roster.students[0].details;
        assert_eq!(
            details.get("email").and_then(|v| v.as_str()),
            Some("alice@example.com")
        );
        assert_eq!(details.get("team").and_then(|v| v.as_str()), Some("Red"));
    }

    #[test]
    fn csv_roundtrip_parses_headers_and_rows() {
        let csv = b"name,team,id\nAlice,Red,1\nBob,,2\n";
        let rows = parse_roster(csv, "roster.csv").unwrap();
        assert_eq!(rows.len(), 2);
        let roster = normalize(&rows).unwrap();
        assert_eq!(roster.students[1].team_name, "Red");
    }
}
