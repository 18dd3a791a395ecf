//! 报表 XLSX 导出

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Format, Workbook};
use tracing::error;

use super::ReportService;
use super::assemble::{self, DenseReport};
use super::results::fetch_report_data;
use crate::models::{ApiResponse, ErrorCode};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 导出逐学生稠密报表
pub async fn export_consolidated_report(
    service: &ReportService,
    request: &HttpRequest,
    event_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let data = match fetch_report_data(&storage, event_id).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::EventNotFound, "活动不存在")));
        }
        Err(e) => {
            error!("读取报表数据失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("读取报表数据失败: {e}"),
                )),
            );
        }
    };

    let report = assemble::assemble_dense_report(&data.sessions, &data.teams, &data.reviews);
    let file_name = format!("{}_consolidated_report.xlsx", data.event.name);

    match generate_xlsx(&report, "Consolidated Report") {
        Ok(buffer) => Ok(xlsx_response(buffer, &file_name)),
        Err(e) => {
            error!("生成 XLSX 失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    format!("生成报表失败: {e}"),
                )),
            )
        }
    }
}

/// 导出汇总结果
pub async fn export_results(
    service: &ReportService,
    request: &HttpRequest,
    event_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let data = match fetch_report_data(&storage, event_id).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::EventNotFound, "活动不存在")));
        }
        Err(e) => {
            error!("读取报表数据失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("读取报表数据失败: {e}"),
                )),
            );
        }
    };

    let rows = assemble::assemble_combined_rows(&data.sessions, &data.teams, &data.reviews);
    let report = DenseReport {
        headers: vec![
            "Team".to_string(),
            "Session".to_string(),
            "Score".to_string(),
            "Remarks".to_string(),
            "Reviewer".to_string(),
            "Submitted At".to_string(),
        ],
        rows: rows
            .into_iter()
            .map(|row| {
                vec![
                    row.team_name,
                    row.session_number.to_string(),
                    row.score_summary,
                    row.remarks.unwrap_or_default(),
                    row.reviewer_id,
                    row.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]
            })
            .collect(),
    };

    match generate_xlsx(&report, "Combined Results") {
        Ok(buffer) => Ok(xlsx_response(buffer, "Evaluation_Results.xlsx")),
        Err(e) => {
            error!("生成 XLSX 失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    format!("生成报表失败: {e}"),
                )),
            )
        }
    }
}

/// 表头加数据行写入单个工作表
fn generate_xlsx(report: &DenseReport, sheet_name: &str) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| e.to_string())?;

    for (col, header) in report.headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| e.to_string())?;
    }

    for (row_index, row) in report.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string((row_index + 1) as u32, col as u16, value)
                .map_err(|e| e.to_string())?;
        }
    }

    // 固定列稍宽，场次列等宽
    sheet.set_column_width(0, 20).ok();
    for col in 1..report.headers.len() {
        sheet.set_column_width(col as u16, 16).ok();
    }

    workbook.save_to_buffer().map(|b| b.to_vec()).map_err(|e| e.to_string())
}

fn xlsx_response(buffer: Vec<u8>, file_name: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(buffer)
}
