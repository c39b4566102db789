use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Datelike, Local};
use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AsOf, ContributionPlan, DistributionPolicy, Person, ProjectionError, SimulationConfig,
    SocialSecurity, SpendingPlan, project,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "glidepath project",
    about = "Year-by-year retirement projection (401k, Roth, taxable account, Social Security, Medicare)"
)]
struct Cli {
    #[arg(long, default_value_t = 50)]
    current_age: u32,
    #[arg(long, default_value_t = 150_000.0)]
    salary: f64,
    #[arg(long, default_value_t = 500_000.0)]
    pretax_balance: f64,
    #[arg(long, default_value_t = 100_000.0)]
    investment_balance: f64,
    #[arg(long, default_value_t = 100_000.0)]
    roth_balance: f64,
    #[arg(long, default_value_t = 60)]
    retirement_age: u32,
    #[arg(long, default_value_t = 88)]
    deceased_age: u32,
    #[arg(long, default_value_t = 80_000.0)]
    spending_before_retirement: f64,
    #[arg(long, default_value_t = 70_000.0)]
    spending_after_retirement: f64,
    #[arg(
        long,
        default_value_t = 20_000.0,
        help = "Annual health insurance between retirement and Medicare"
    )]
    insurance_spending: f64,
    #[arg(long, default_value_t = 6.0, help = "Employee 401k contribution, percent of salary")]
    employee_contribution: f64,
    #[arg(long, default_value_t = 50.0, help = "Employer match, percent of the employee contribution")]
    employer_match: f64,
    #[arg(long, default_value_t = 6.0, help = "Employee contribution percent the employer matches up to")]
    employer_match_cap: f64,
    #[arg(long, default_value_t = 0.0)]
    roth_401k_contribution: f64,
    #[arg(long, default_value_t = 62)]
    social_security_age: u32,
    #[arg(long, default_value_t = 3_000.0)]
    social_security_monthly: f64,
    #[arg(long, default_value_t = 60)]
    distribution_age: u32,
    #[arg(
        long,
        default_value_t = 12,
        help = "Marginal bracket percent to fill with Roth conversions; 0 disables"
    )]
    target_bracket: u32,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    distribution_offset: f64,
    #[arg(long, default_value_t = 65)]
    medicare_age: u32,
    #[arg(long, default_value_t = 75)]
    rmd_age: u32,
    #[arg(long, default_value_t = 60)]
    no_penalty_age: u32,
    #[arg(long, default_value_t = 12.0, allow_hyphen_values = true)]
    return_before_retirement: f64,
    #[arg(long, default_value_t = 6.0, allow_hyphen_values = true)]
    return_after_retirement: f64,
    #[arg(long, default_value_t = 2.0)]
    merit_increase: f64,
    #[arg(long, default_value_t = 2.8)]
    inflation: f64,
    #[arg(long, default_value_t = 5.0)]
    state_tax_before_retirement: f64,
    #[arg(long, default_value_t = 0.0)]
    state_tax_after_retirement: f64,
    #[arg(long, help = "Projection start year; defaults to the current year")]
    start_year: Option<i32>,
    #[arg(long, help = "Projection start month (1-12); defaults to the current month")]
    start_month: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<u32>,
    salary: Option<f64>,
    pretax_balance: Option<f64>,
    investment_balance: Option<f64>,
    roth_balance: Option<f64>,
    retirement_age: Option<u32>,
    deceased_age: Option<u32>,
    spending_before_retirement: Option<f64>,
    spending_after_retirement: Option<f64>,
    insurance_spending: Option<f64>,
    employee_contribution: Option<f64>,
    employer_match: Option<f64>,
    employer_match_cap: Option<f64>,
    roth_401k_contribution: Option<f64>,
    social_security_age: Option<u32>,
    social_security_monthly: Option<f64>,
    distribution_age: Option<u32>,
    target_bracket: Option<u32>,
    distribution_offset: Option<f64>,
    medicare_age: Option<u32>,
    rmd_age: Option<u32>,
    no_penalty_age: Option<u32>,
    return_before_retirement: Option<f64>,
    return_after_retirement: Option<f64>,
    merit_increase: Option<f64>,
    inflation: Option<f64>,
    state_tax_before_retirement: Option<f64>,
    state_tax_after_retirement: Option<f64>,
    start_year: Option<i32>,
    start_month: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_config(cli: Cli) -> Result<SimulationConfig, String> {
    if cli.retirement_age < cli.current_age {
        return Err("--retirement-age must be >= --current-age".to_string());
    }

    if cli.deceased_age <= cli.retirement_age {
        return Err("--deceased-age must be > --retirement-age".to_string());
    }

    for (flag, value) in [
        ("--salary", cli.salary),
        ("--pretax-balance", cli.pretax_balance),
        ("--investment-balance", cli.investment_balance),
        ("--roth-balance", cli.roth_balance),
        ("--spending-before-retirement", cli.spending_before_retirement),
        ("--spending-after-retirement", cli.spending_after_retirement),
        ("--insurance-spending", cli.insurance_spending),
        ("--social-security-monthly", cli.social_security_monthly),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{flag} must be >= 0"));
        }
    }

    for (flag, value) in [
        ("--employee-contribution", cli.employee_contribution),
        ("--employer-match", cli.employer_match),
        ("--employer-match-cap", cli.employer_match_cap),
        ("--roth-401k-contribution", cli.roth_401k_contribution),
        ("--state-tax-before-retirement", cli.state_tax_before_retirement),
        ("--state-tax-after-retirement", cli.state_tax_after_retirement),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(format!("{flag} must be between 0 and 100"));
        }
    }

    if cli.employee_contribution + cli.roth_401k_contribution > 100.0 {
        return Err(
            "--employee-contribution plus --roth-401k-contribution must be <= 100".to_string(),
        );
    }

    for (flag, value) in [
        ("--return-before-retirement", cli.return_before_retirement),
        ("--return-after-retirement", cli.return_after_retirement),
    ] {
        if !value.is_finite() || value <= -100.0 {
            return Err(format!("{flag} must be > -100"));
        }
    }

    if !cli.merit_increase.is_finite() || cli.merit_increase < 0.0 {
        return Err("--merit-increase must be >= 0".to_string());
    }

    if !cli.inflation.is_finite() || cli.inflation < 0.0 {
        return Err("--inflation must be >= 0".to_string());
    }

    if !cli.distribution_offset.is_finite() {
        return Err("--distribution-offset must be a finite amount".to_string());
    }

    let today = Local::now();
    let as_of = AsOf {
        year: cli.start_year.unwrap_or_else(|| today.year()),
        month: cli.start_month.unwrap_or_else(|| today.month()),
    };
    if !(1..=12).contains(&as_of.month) {
        return Err("--start-month must be between 1 and 12".to_string());
    }

    Ok(SimulationConfig {
        person: Person {
            age: cli.current_age,
            salary: cli.salary,
            pretax_balance: cli.pretax_balance,
            investment_balance: cli.investment_balance,
            roth_balance: cli.roth_balance,
            retirement_age: cli.retirement_age,
            deceased_age: cli.deceased_age,
        },
        spending: SpendingPlan {
            before_retirement: cli.spending_before_retirement,
            after_retirement: cli.spending_after_retirement,
            insurance: cli.insurance_spending,
        },
        contributions: ContributionPlan {
            employee_rate: cli.employee_contribution / 100.0,
            employer_match_rate: cli.employer_match / 100.0,
            employer_match_cap: cli.employer_match_cap / 100.0,
            roth_401k_rate: cli.roth_401k_contribution / 100.0,
        },
        social_security: SocialSecurity {
            claim_age: cli.social_security_age,
            monthly_amount: cli.social_security_monthly,
        },
        distribution: DistributionPolicy {
            start_age: cli.distribution_age,
            target_bracket: (cli.target_bracket > 0).then_some(cli.target_bracket),
            offset: cli.distribution_offset,
        },
        medicare_age: cli.medicare_age,
        rmd_age: cli.rmd_age,
        no_penalty_age: cli.no_penalty_age,
        return_before_retirement: cli.return_before_retirement / 100.0,
        return_after_retirement: cli.return_after_retirement / 100.0,
        merit_increase: cli.merit_increase / 100.0,
        inflation: cli.inflation / 100.0,
        state_tax_before_retirement: cli.state_tax_before_retirement / 100.0,
        state_tax_after_retirement: cli.state_tax_after_retirement / 100.0,
        as_of,
    })
}

/// `glidepath project [flags]`: print the projection as JSON on stdout.
pub fn run_cli<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    let config = build_config(cli)?;
    let projection = project(&config).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&projection)
        .map_err(|e| format!("failed to serialize projection: {e}"))?;
    println!("{json}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("glidepath HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let config = match config_from_payload(payload) {
        Ok(config) => config,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match project(&config) {
        Ok(projection) => json_response(StatusCode::OK, projection),
        Err(e) => {
            warn!("projection failed: {e}");
            error_response(status_for(&e), &e.to_string())
        }
    }
}

fn status_for(error: &ProjectionError) -> StatusCode {
    match error {
        ProjectionError::Configuration { .. } => StatusCode::BAD_REQUEST,
        ProjectionError::OutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ProjectionError::NotFound { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn config_from_json(json: &str) -> Result<SimulationConfig, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    config_from_payload(payload)
}

macro_rules! apply_overrides {
    ($cli:ident, $payload:ident, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(v) = $payload.$field {
                $cli.$field = v;
            }
        )*
    };
}

fn config_from_payload(payload: ProjectPayload) -> Result<SimulationConfig, String> {
    let mut cli = default_cli_for_api();

    apply_overrides!(
        cli,
        payload,
        [
            current_age,
            salary,
            pretax_balance,
            investment_balance,
            roth_balance,
            retirement_age,
            deceased_age,
            spending_before_retirement,
            spending_after_retirement,
            insurance_spending,
            employee_contribution,
            employer_match,
            employer_match_cap,
            roth_401k_contribution,
            social_security_age,
            social_security_monthly,
            distribution_age,
            target_bracket,
            distribution_offset,
            medicare_age,
            rmd_age,
            no_penalty_age,
            return_before_retirement,
            return_after_retirement,
            merit_increase,
            inflation,
            state_tax_before_retirement,
            state_tax_after_retirement,
        ]
    );
    if payload.start_year.is_some() {
        cli.start_year = payload.start_year;
    }
    if payload.start_month.is_some() {
        cli.start_month = payload.start_month;
    }

    build_config(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 50,
        salary: 150_000.0,
        pretax_balance: 500_000.0,
        investment_balance: 100_000.0,
        roth_balance: 100_000.0,
        retirement_age: 60,
        deceased_age: 88,
        spending_before_retirement: 80_000.0,
        spending_after_retirement: 70_000.0,
        insurance_spending: 20_000.0,
        employee_contribution: 6.0,
        employer_match: 50.0,
        employer_match_cap: 6.0,
        roth_401k_contribution: 0.0,
        social_security_age: 62,
        social_security_monthly: 3_000.0,
        distribution_age: 60,
        target_bracket: 12,
        distribution_offset: 0.0,
        medicare_age: 65,
        rmd_age: 75,
        no_penalty_age: 60,
        return_before_retirement: 12.0,
        return_after_retirement: 6.0,
        merit_increase: 2.0,
        inflation: 2.8,
        state_tax_before_retirement: 5.0,
        state_tax_after_retirement: 0.0,
        start_year: None,
        start_month: None,
    }
}
