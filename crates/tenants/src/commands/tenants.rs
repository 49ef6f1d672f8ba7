//! Tenant command handlers.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;
use tracing::debug;

use tenants_api::{
    ApiResponse, Listing, ListingQuery, PaginatedResponse, Tenant, TenantId, TenantInfo,
    TenantStatus, TenantUpdate, load_listing,
};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat, UpdateArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TenantRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl From<&Tenant> for TenantRow {
    fn from(t: &Tenant) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            status: t.status_label(),
        }
    }
}

/// Resolve a `--status` value against the known status labels.
fn parse_status(value: &str) -> Result<TenantStatus, CliError> {
    let value = value.trim();
    value
        .parse()
        .ok()
        .or_else(|| TenantStatus::iter().find(|s| s.label().eq_ignore_ascii_case(value)))
        .ok_or_else(|| CliError::Validation {
            field: "status".into(),
            reason: format!(
                "expected one of {}",
                TenantStatus::iter()
                    .map(TenantStatus::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
}

#[derive(Serialize)]
struct Created<'a> {
    id: i64,
    name: &'a str,
}

fn tenant_detail(t: &Tenant) -> String {
    output::detail_lines(&[
        ("ID", t.id.to_string()),
        ("Name", t.name.clone()),
        ("Status", t.status_label().to_owned()),
    ])
}

fn info_detail(info: &TenantInfo) -> String {
    output::detail_lines(&[
        ("Active", info.active.to_string()),
        ("Inactive", info.inactive.to_string()),
        ("Demo", info.demo.to_string()),
        ("Total", info.total.to_string()),
    ])
}

/// Footer shown under the listing table.
fn page_footer(page: &PaginatedResponse<Tenant>, info: &ApiResponse<TenantInfo>) -> String {
    let position = format!(
        "Page {} of {} · {} matching",
        page.page_number,
        page.total_pages().max(1),
        page.total_count
    );
    match info {
        ApiResponse::Success(i) => format!(
            "{position} · Active {} · Inactive {} · Demo {} · Total {}",
            i.active, i.inactive, i.demo, i.total
        ),
        ApiResponse::Error(e) => format!("{position} · counts unavailable: {}", e.message),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(session: &Session, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let page_size = args.page_size.unwrap_or(session.page_size);
    let query = ListingQuery {
        page: args.page,
        status: args.status,
        name: args.name,
        page_size,
    };
    let color = output::should_color(&global.color);

    let mut listing = load_listing(&session.client, &query).await?;

    // Follow a single redirect back to the first page.
    if let Listing::Redirect { ref location } = listing {
        debug!(%location, "following listing redirect");
        output::notice_info(
            &format!("Page {} is out of range, showing page 1", query.page),
            color,
            global.quiet,
        );
        let target = location.split_once('?').map_or("", |(_, q)| q);
        let first = ListingQuery::from_query_string(target).with_page_size(page_size);
        listing = load_listing(&session.client, &first).await?;
    }

    // An empty page past the first sends the user back to `redirect_page`.
    if let Listing::Empty { redirect_page, .. } = listing {
        if redirect_page != query.page {
            debug!(page = query.page, redirect_page, "following empty-page redirect");
            output::notice_info(
                &format!("No tenants on page {}, showing page {redirect_page}", query.page),
                color,
                global.quiet,
            );
            let target = ListingQuery {
                page: redirect_page,
                ..query.clone()
            };
            listing = load_listing(&session.client, &target).await?;
        }
    }

    if matches!(
        global.output,
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml
    ) {
        let out = output::render_single(&global.output, &listing, |_| String::new(), |_| {
            String::new()
        })?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    match listing {
        Listing::Empty { .. } => {
            output::notice_info("No tenants found.", color, global.quiet);
            Ok(())
        }
        Listing::Loaded { tenants, info } => {
            let page = tenants
                .into_result()
                .map_err(|e| CliError::from_api(e, None, &session.profile_name))?;
            let out = output::render_list(
                &global.output,
                &page.items,
                |t| TenantRow::from(t),
                |t| t.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) {
                output::notice_info(&page_footer(&page, &info), color, global.quiet);
            }
            Ok(())
        }
        // A second redirect cannot happen: the first page is always in range.
        Listing::Redirect { location } => Err(CliError::BadResponse {
            message: format!("unexpected redirect to {location}"),
        }),
    }
}

pub async fn get(session: &Session, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let tenant = session
        .client
        .get_tenant_by_id(&TenantId::from(id))
        .await?
        .into_result()
        .map_err(|e| CliError::from_api(e, Some(id), &session.profile_name))?;

    let out = output::render_single(&global.output, &tenant, tenant_detail, |t| {
        t.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn create(session: &Session, name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let id = session
        .client
        .create_tenant(name)
        .await?
        .into_result()
        .map_err(|e| CliError::from_api(e, None, &session.profile_name))?;

    let created = Created { id, name };
    let out = output::render_single(
        &global.output,
        &created,
        |c| format!("Created tenant '{}' with ID {}", c.name, c.id),
        |c| c.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn update(session: &Session, args: UpdateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut update = TenantUpdate::new();
    if let Some(name) = args.name {
        update = update.name(name);
    }
    if let Some(status) = args.status.as_deref() {
        update = update.status(parse_status(status)?);
    }
    if update.is_empty() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "nothing to change; pass --name and/or --status".into(),
        });
    }

    session
        .client
        .update_tenant(&TenantId::from(args.id.as_str()), &update)
        .await?
        .into_result()
        .map_err(|e| CliError::from_api(e, Some(&args.id), &session.profile_name))?;

    output::notice_ok(
        &format!("Updated tenant {}", args.id),
        output::should_color(&global.color),
        global.quiet,
    );
    Ok(())
}

pub async fn delete(session: &Session, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm(&format!("Delete tenant {id}?"), "delete", global.yes)? {
        return Ok(());
    }

    session
        .client
        .delete_tenant(&TenantId::from(id))
        .await?
        .into_result()
        .map_err(|e| CliError::from_api(e, Some(id), &session.profile_name))?;

    output::notice_ok(
        &format!("Deleted tenant {id}"),
        output::should_color(&global.color),
        global.quiet,
    );
    Ok(())
}

pub async fn info(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let info = session
        .client
        .get_tenants_info()
        .await?
        .into_result()
        .map_err(|e| CliError::from_api(e, None, &session.profile_name))?;

    let out = output::render_single(&global.output, &info, info_detail, |i| i.total.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tenants_api::ApiError;

    use super::*;

    fn page(total_count: u64) -> PaginatedResponse<Tenant> {
        PaginatedResponse {
            items: vec![Tenant {
                id: TenantId::from(1_i64),
                name: "acme".into(),
                status: 7,
            }],
            page_number: 1,
            page_size: 5,
            total_count,
        }
    }

    #[test]
    fn unknown_status_code_renders_as_unknown() {
        let row = TenantRow::from(&page(1).items[0]);
        assert_eq!(row.status, "Unknown");
        assert_eq!(row.id, "1");
    }

    #[test]
    fn footer_includes_counts() {
        let info = ApiResponse::Success(TenantInfo {
            active: 4,
            inactive: 1,
            demo: 2,
            total: 7,
        });
        assert_eq!(
            page_footer(&page(7), &info),
            "Page 1 of 2 · 7 matching · Active 4 · Inactive 1 · Demo 2 · Total 7"
        );
    }

    #[test]
    fn footer_reports_missing_counts() {
        let info = ApiResponse::Error(ApiError::new("down"));
        assert_eq!(
            page_footer(&page(0), &info),
            "Page 1 of 1 · 0 matching · counts unavailable: down"
        );
    }

    #[test]
    fn status_flag_resolves_known_labels() {
        assert_eq!(parse_status("Demo").unwrap().code(), 2);
        assert_eq!(parse_status("inactive").unwrap(), TenantStatus::Inactive);
        assert_eq!(parse_status(" ACTIVE ").unwrap(), TenantStatus::Active);
    }

    #[test]
    fn status_flag_rejects_unknown_labels() {
        let err = parse_status("Archived").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
        assert!(err.to_string().contains("Active, Inactive, Demo"), "{err}");
    }
}
