//! Settlement report as CSV.
//!
//! The file has four sections separated by an empty line: a summary of the
//! group, the member roster, the expense list and the transfers with the
//! contacts needed to pay.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use csv::{Writer, WriterBuilder};
use engine::SettlementReport;

use crate::{ServerError, server::ServerState};

pub async fn csv(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let report = state.engine.report(&group_id).await?;
    let data = render(&report)
        .map_err(|err| ServerError::Internal(format!("failed to render export: {err}")))?;
    tracing::debug!(group_id = %group_id, bytes = data.len(), "report exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"settlement-{group_id}.csv\""),
            ),
        ],
        data,
    ))
}

pub(crate) fn render(report: &SettlementReport) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(vec![]);

    summary(&mut writer, report)?;
    writer.write_record([""])?;

    writer.write_record(["number", "name", "phone", "account", "joined_at"])?;
    for (pos, line) in report.members.iter().enumerate() {
        writer.write_record([
            (pos + 1).to_string(),
            line.name.clone(),
            line.phone.clone(),
            line.account.clone(),
            line.joined_at.format("%Y-%m-%d").to_string(),
        ])?;
    }
    writer.write_record([""])?;

    writer.write_record(["date", "title", "amount", "payer", "participants", "per_person"])?;
    for line in &report.expenses {
        writer.write_record([
            line.date.to_string(),
            line.title.clone(),
            line.amount.to_string(),
            line.payer.clone(),
            line.participants.join(", "),
            line.per_person_amount.to_string(),
        ])?;
    }
    writer.write_record([""])?;

    writer.write_record(["from", "to", "amount", "from_phone", "to_account"])?;
    for line in &report.settlements {
        writer.write_record([
            line.from.as_str(),
            line.to.as_str(),
            line.amount.to_string().as_str(),
            line.from_phone.as_str(),
            line.to_account.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

fn summary(writer: &mut Writer<Vec<u8>>, report: &SettlementReport) -> Result<(), csv::Error> {
    let rows = [
        ("group", report.group_name.clone()),
        ("description", report.description.clone()),
        ("created_at", report.created_at.format("%Y-%m-%d").to_string()),
        ("members", report.member_count.to_string()),
        ("expenses", report.expense_count.to_string()),
        ("total_expenses", report.total_expenses.to_string()),
        ("total_settlements", report.total_settlements.to_string()),
        ("average_per_member", report.average_per_member.to_string()),
    ];
    for (key, value) in rows {
        writer.write_record([key, value.as_str()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use engine::{ExpenseLine, MemberLine, SettlementLine};

    use super::*;

    fn report() -> SettlementReport {
        SettlementReport {
            group_name: "Trip".to_string(),
            description: "Jeju, summer".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
            member_count: 2,
            expense_count: 1,
            total_expenses: 100,
            total_settlements: 50,
            average_per_member: 50,
            members: vec![
                MemberLine {
                    name: "Ana".to_string(),
                    phone: "010-1".to_string(),
                    account: "bank 1".to_string(),
                    joined_at: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
                },
                MemberLine {
                    name: "Bo".to_string(),
                    phone: "010-2".to_string(),
                    account: "bank 2".to_string(),
                    joined_at: Utc.with_ymd_and_hms(2024, 7, 3, 18, 30, 0).unwrap(),
                },
            ],
            expenses: vec![ExpenseLine {
                date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
                title: "Dinner".to_string(),
                amount: 100,
                payer: "Ana".to_string(),
                participants: vec!["Ana".to_string(), "Bo".to_string()],
                per_person_amount: 50,
            }],
            settlements: vec![SettlementLine {
                from: "Bo".to_string(),
                to: "Ana".to_string(),
                amount: 50,
                from_phone: "010-2".to_string(),
                to_account: "bank 1".to_string(),
            }],
        }
    }

    #[test]
    fn renders_all_sections() {
        let data = String::from_utf8(render(&report()).unwrap()).unwrap();
        let lines: Vec<_> = data.lines().collect();

        assert_eq!(lines[0], "group,Trip");
        assert_eq!(lines[1], "description,\"Jeju, summer\"");
        assert_eq!(lines[2], "created_at,2024-07-01");
        assert!(lines.contains(&"number,name,phone,account,joined_at"));
        assert!(lines.contains(&"1,Ana,010-1,bank 1,2024-07-01"));
        assert!(lines.contains(&"2,Bo,010-2,bank 2,2024-07-03"));
        assert!(lines.contains(&"2024-07-02,Dinner,100,Ana,\"Ana, Bo\",50"));
        assert_eq!(lines.last(), Some(&"Bo,Ana,50,010-2,bank 1"));
    }
}
