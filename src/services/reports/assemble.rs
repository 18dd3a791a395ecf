//! 报表装配
//!
//! 把稀疏的评审提交还原成稠密矩阵：每个 (团队, 学生) 一行，每个场次
//! 四列（总分、评审人、考勤、提交时间），缺失的提交用 "N/A" 占位。
//! 纯函数，不触碰存储。

use std::collections::HashMap;

use crate::models::events::entities::ReviewSession;
use crate::models::reviews::entities::Review;
use crate::models::reviews::responses::CombinedResultRow;
use crate::models::teams::responses::TeamWithMembers;

/// 缺失数据占位符
pub const NOT_AVAILABLE: &str = "N/A";

/// 表头加数据行的中间表示，JSON 与 XLSX 导出共用
#[derive(Debug, Clone, PartialEq)]
pub struct DenseReport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 装配逐学生稠密报表
///
/// 只纳入有成员的团队；场次按编号排列，每个场次展开为四列。
pub fn assemble_dense_report(
    sessions: &[ReviewSession],
    teams: &[TeamWithMembers],
    reviews: &[Review],
) -> DenseReport {
    let mut headers = vec![
        "Team Name".to_string(),
        "Student ID".to_string(),
        "Student Name".to_string(),
    ];
    for session in sessions {
        let n = session.session_number;
        headers.push(format!("S{n} Marks"));
        headers.push(format!("S{n} Reviewer"));
        headers.push(format!("S{n} Attendance"));
        headers.push(format!("S{n} Timestamp"));
    }

    // (team_id, session_id) -> 提交
    let by_key: HashMap<(i64, i64), &Review> = reviews
        .iter()
        .map(|review| ((review.team_id, review.session_id), review))
        .collect();

    let mut sorted_teams: Vec<&TeamWithMembers> =
        teams.iter().filter(|t| !t.members.is_empty()).collect();
    sorted_teams.sort_by(|a, b| a.name.cmp(&b.name));

    let mut rows = Vec::new();
    for team in sorted_teams {
        for member in &team.members {
            let mut row = vec![
                team.name.clone(),
                member.student_id.clone(),
                member.name.clone(),
            ];
            for session in sessions {
                match by_key.get(&(team.id, session.id)) {
                    Some(review) => {
                        row.push(review.total_marks().to_string());
                        row.push(review.reviewer_id.clone());
                        row.push(attendance_label(review, &member.student_id));
                        row.push(review.created_at.format("%Y-%m-%d %H:%M:%S").to_string());
                    }
                    None => {
                        for _ in 0..4 {
                            row.push(NOT_AVAILABLE.to_string());
                        }
                    }
                }
            }
            rows.push(row);
        }
    }

    DenseReport { headers, rows }
}

// 提交之后才加入团队的成员按缺席处理
fn attendance_label(review: &Review, student_id: &str) -> String {
    if review.attendance.get(student_id).copied().unwrap_or(false) {
        "Present".to_string()
    } else {
        "Absent".to_string()
    }
}

/// 装配汇总视图：每个已提交评审的 (团队, 场次) 一行
///
/// 分数摘要格式为 `"<总分> / <满分>"`，按团队名、场次编号排序。
pub fn assemble_combined_rows(
    sessions: &[ReviewSession],
    teams: &[TeamWithMembers],
    reviews: &[Review],
) -> Vec<CombinedResultRow> {
    let session_by_id: HashMap<i64, &ReviewSession> =
        sessions.iter().map(|s| (s.id, s)).collect();
    let team_name_by_id: HashMap<i64, &str> =
        teams.iter().map(|t| (t.id, t.name.as_str())).collect();

    let mut rows: Vec<CombinedResultRow> = reviews
        .iter()
        .filter_map(|review| {
            let session = session_by_id.get(&review.session_id)?;
            let team_name = team_name_by_id.get(&review.team_id)?;
            Some(CombinedResultRow {
                team_name: team_name.to_string(),
                session_number: session.session_number,
                score_summary: format!("{} / {}", review.total_marks(), session.max_total()),
                remarks: review.remarks.clone(),
                reviewer_id: review.reviewer_id.clone(),
                created_at: review.created_at,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.team_name
            .cmp(&b.team_name)
            .then(a.session_number.cmp(&b.session_number))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::entities::Criterion;
    use crate::models::students::entities::Student;

    fn criterion(id: &str, max: i32) -> Criterion {
        Criterion {
            id: id.to_string(),
            label: id.to_string(),
            max_marks: max,
        }
    }

    fn session(id: i64, number: i32, criteria: Vec<Criterion>) -> ReviewSession {
        ReviewSession {
            id,
            event_id: 1,
            session_number: number,
            criteria,
        }
    }

    fn student(id: i64, team_id: i64, student_id: &str, name: &str) -> Student {
        Student {
            id,
            team_id,
            student_id: student_id.to_string(),
            name: name.to_string(),
            details: None,
        }
    }

    fn review(team_id: i64, session_id: i64, marks: &[(&str, i32)]) -> Review {
        Review {
            id: 0,
            team_id,
            session_id,
            attendance: HashMap::from([("S01".to_string(), true), ("S02".to_string(), false)]),
            marks: marks.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            remarks: None,
            reviewer_id: "judge-a".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn teams() -> Vec<TeamWithMembers> {
        vec![
            TeamWithMembers {
                id: 5,
                name: "Red".to_string(),
                members: vec![
                    student(1, 5, "S01", "Alice"),
                    student(2, 5, "S02", "Bob"),
                ],
            },
            TeamWithMembers {
                id: 6,
                name: "Blue".to_string(),
                members: vec![student(3, 6, "S03", "Carol")],
            },
        ]
    }

    #[test]
    fn dense_report_has_one_row_per_member_and_four_fields_per_session() {
        let sessions = vec![
            session(11, 1, vec![criterion("C1", 10)]),
            session(12, 2, vec![criterion("C2", 20)]),
        ];
        let reviews = vec![review(5, 11, &[("C1", 7)])];
        let report = assemble_dense_report(&sessions, &teams(), &reviews);

        // 3 名成员，3 个固定列 + 2 场次 × 4 列
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.headers.len(), 3 + 2 * 4);
        assert_eq!(report.headers[0], "Team Name");
        for row in &report.rows {
            assert_eq!(row.len(), report.headers.len());
        }
    }

    #[test]
    fn missing_submission_fills_na_sentinels() {
        let sessions = vec![session(11, 1, vec![criterion("C1", 10)])];
        let report = assemble_dense_report(&sessions, &teams(), &[]);
        for row in &report.rows {
            assert_eq!(&row[3..], &["N/A", "N/A", "N/A", "N/A"]);
        }
    }

    #[test]
    fn submitted_session_shows_total_reviewer_and_attendance() {
        let sessions = vec![session(11, 1, vec![criterion("C1", 10), criterion("C2", 5)])];
        let reviews = vec![review(5, 11, &[("C1", 7), ("C2", 3)])];
        let report = assemble_dense_report(&sessions, &teams(), &reviews);

        // Red 排在 Blue 之后（按名称排序）
        let alice = report
            .rows
            .iter()
            .find(|row| row[2] == "Alice")
            .expect("Alice row");
        assert_eq!(alice[3], "10");
        assert_eq!(alice[4], "judge-a");
        assert_eq!(alice[5], "Present");

        let bob = report
            .rows
            .iter()
            .find(|row| row[2] == "Bob")
            .expect("Bob row");
        assert_eq!(bob[5], "Absent");
    }

    #[test]
    fn member_missing_from_attendance_map_counts_as_absent() {
        let sessions = vec![session(11, 1, vec![criterion("C1", 10)])];
        // 提交里的考勤只记录了 S01/S02，Carol (S03) 是提交之后加入的成员
        let reviews = vec![review(6, 11, &[("C1", 7)])];
        let report = assemble_dense_report(&sessions, &teams(), &reviews);

        let carol = report
            .rows
            .iter()
            .find(|row| row[2] == "Carol")
            .expect("Carol row");
        assert_eq!(carol[5], "Absent");
    }

    #[test]
    fn memberless_teams_are_excluded() {
        let mut all_teams = teams();
        all_teams.push(TeamWithMembers {
            id: 7,
            name: "Empty".to_string(),
            members: vec![],
        });
        let sessions = vec![session(11, 1, vec![criterion("C1", 10)])];
        let report = assemble_dense_report(&sessions, &all_teams, &[]);
        assert!(report.rows.iter().all(|row| row[0] != "Empty"));
    }

    #[test]
    fn combined_rows_format_score_over_max() {
        let sessions = vec![session(11, 1, vec![criterion("C1", 10)])];
        let reviews = vec![review(5, 11, &[("C1", 10)])];
        let rows = assemble_combined_rows(&sessions, &teams(), &reviews);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score_summary, "10 / 10");
        assert_eq!(rows[0].team_name, "Red");
        assert_eq!(rows[0].session_number, 1);
    }

    #[test]
    fn combined_rows_carry_remarks() {
        let sessions = vec![session(11, 1, vec![criterion("C1", 10)])];
        let mut submitted = review(5, 11, &[("C1", 4)]);
        submitted.remarks = Some("strong demo".to_string());
        let rows = assemble_combined_rows(&sessions, &teams(), &[submitted]);
        assert_eq!(rows[0].remarks.as_deref(), Some("strong demo"));
    }

    #[test]
    fn combined_rows_only_include_submitted_pairs() {
        let sessions = vec![
            session(11, 1, vec![criterion("C1", 10)]),
            session(12, 2, vec![criterion("C2", 20)]),
        ];
        let reviews = vec![review(6, 12, &[("C2", 15)])];
        let rows = assemble_combined_rows(&sessions, &teams(), &reviews);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team_name, "Blue");
        assert_eq!(rows[0].score_summary, "15 / 20");
    }
}
