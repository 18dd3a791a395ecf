//! 创建活动并导入花名册
//!
//! 持久化顺序与失败策略：活动和场次创建失败整体中止；团队 upsert 失败
//! 同样中止；学生批量写入失败只降级为 warning，已创建的活动保留。

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use tracing::{error, info, warn};

use super::EventService;
use super::roster::{self, RosterError};
use crate::config::AppConfig;
use crate::models::events::entities::Criterion;
use crate::models::events::requests::CreateEventRequest;
use crate::models::events::responses::EventCreatedResponse;
use crate::models::students::requests::NewStudent;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::random_code::generate_random_code;

pub async fn create_event(
    service: &EventService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 读取 multipart：payload 字段为 JSON，file 字段为花名册
    let (event_request, file_bytes, file_name) =
        match read_create_event_multipart(&mut payload).await {
            Ok(parts) => parts,
            Err(message) => {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::BadRequest, message)));
            }
        };

    // 输入校验
    if let Err(message) = validate_event_request(&event_request) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, message)));
    }

    // 解析并归一化花名册
    let rows = match roster::parse_roster(&file_bytes, &file_name) {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(roster_error_code(&e), e.to_string())));
        }
    };

    let max_rows = AppConfig::get().import.max_rows;
    if rows.len() > max_rows {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            format!("单次导入最多支持 {max_rows} 行"),
        )));
    }

    let normalized = match roster::normalize(&rows) {
        Ok(normalized) => normalized,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(roster_error_code(&e), e.to_string())));
        }
    };

    // 为每条评分标准分配随机 id
    let criteria_per_session: Vec<Vec<Criterion>> = event_request
        .sessions
        .iter()
        .map(|session| {
            session
                .criteria
                .iter()
                .map(|spec| Criterion {
                    id: generate_random_code(8),
                    label: spec.label.trim().to_string(),
                    max_marks: spec.max_marks,
                })
                .collect()
        })
        .collect();

    // 活动与场次创建失败是致命的
    let event = match storage
        .create_event(
            event_request.name.trim(),
            criteria_per_session.len() as i32,
        )
        .await
    {
        Ok(event) => event,
        Err(e) => {
            error!("创建活动失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::EventCreationFailed,
                    format!("创建活动失败: {e}"),
                )),
            );
        }
    };

    let sessions = match storage.create_sessions(event.id, &criteria_per_session).await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("创建场次失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::EventCreationFailed,
                    format!("创建场次失败: {e}"),
                )),
            );
        }
    };

    let teams = match storage.upsert_teams_by_name(&normalized.team_names).await {
        Ok(teams) => teams,
        Err(e) => {
            error!("写入团队失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::EventCreationFailed,
                    format!("写入团队失败: {e}"),
                )),
            );
        }
    };

    // 把团队ID映射回学生候选
    let team_ids: HashMap<&str, i64> = teams
        .iter()
        .map(|team| (team.name.as_str(), team.id))
        .collect();

    let mut batch: Vec<NewStudent> = Vec::with_capacity(normalized.students.len());
    for student in &normalized.students {
        match team_ids.get(student.team_name.as_str()) {
            Some(team_id) => batch.push(NewStudent {
                team_id: *team_id,
                student_id: student.student_id.clone(),
                name: student.name.clone(),
                details: Some(student.details.clone()),
            }),
            None => {
                // upsert 未返回的团队名不应出现，留作警告
                warn!("团队 {} 在 upsert 结果中缺失", student.team_name);
            }
        }
    }

    // 学生写入失败不致命：活动、场次与团队已提交
    let mut warnings: Vec<String> = Vec::new();
    let students_created = match storage.upsert_students(&batch).await {
        Ok(count) => count,
        Err(e) => {
            warn!("学生批量写入失败: {}", e);
            warnings.push(format!("学生批量写入失败: {e}"));
            0
        }
    };

    info!(
        "活动 {} 创建完成: {} 个场次, {} 个团队, {} 名学生",
        event.name,
        sessions.len(),
        teams.len(),
        students_created
    );

    let response = EventCreatedResponse {
        event,
        sessions,
        teams_created: teams.len(),
        students_created,
        warnings,
    };

    Ok(HttpResponse::Created().json(ApiResponse::success(response, "活动创建成功")))
}

fn validate_event_request(request: &CreateEventRequest) -> Result<(), String> {
    if request.name.trim().is_empty() {
        return Err("活动名称不能为空".to_string());
    }
    if request.sessions.is_empty() {
        return Err("至少需要一个评审场次".to_string());
    }
    for (index, session) in request.sessions.iter().enumerate() {
        if session.criteria.is_empty() {
            return Err(format!("场次 {} 至少需要一条评分标准", index + 1));
        }
        for criterion in &session.criteria {
            if criterion.label.trim().is_empty() {
                return Err(format!("场次 {} 存在空的评分标准名称", index + 1));
            }
            if criterion.max_marks <= 0 {
                return Err(format!(
                    "场次 {} 的评分标准 {} 满分必须为正数",
                    index + 1,
                    criterion.label
                ));
            }
        }
    }
    Ok(())
}

fn roster_error_code(error: &RosterError) -> ErrorCode {
    match error {
        RosterError::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
        RosterError::EmptyRoster => ErrorCode::ImportFileEmpty,
        RosterError::MissingNameColumn => ErrorCode::ImportFileMissingColumn,
    }
}

async fn read_create_event_multipart(
    payload: &mut Multipart,
) -> Result<(CreateEventRequest, Vec<u8>, String), String> {
    let mut event_json = Vec::new();
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("读取字段失败: {e}"))?;
        let name = field.name().map(|n| n.to_string()).unwrap_or_default();

        match name.as_str() {
            "payload" => {
                while let Some(chunk) = field.next().await {
                    let data = chunk.map_err(|e| format!("读取数据失败: {e}"))?;
                    event_json.extend_from_slice(&data);
                }
            }
            "file" => {
                if let Some(content_disposition) = field.content_disposition() {
                    file_name = content_disposition
                        .get_filename()
                        .unwrap_or("roster.csv")
                        .to_string();
                }
                while let Some(chunk) = field.next().await {
                    let data = chunk.map_err(|e| format!("读取数据失败: {e}"))?;
                    file_bytes.extend_from_slice(&data);
                }
            }
            _ => {
                // 忽略未知字段
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| format!("读取数据失败: {e}"))?;
                }
            }
        }
    }

    if event_json.is_empty() {
        return Err("未找到 payload 字段".to_string());
    }
    if file_bytes.is_empty() {
        return Err("未找到花名册文件".to_string());
    }

    let event_request: CreateEventRequest =
        serde_json::from_slice(&event_json).map_err(|e| format!("payload 解析失败: {e}"))?;

    Ok((event_request, file_bytes, file_name))
}
