mod bootstrap;
mod table;

use anyhow::Result;
use rental_core::calendar::SeasonalCalendar;
use rental_core::models::CountField;
use rental_core::settings::Settings;
use rental_data::catalog;
use rental_data::reader::{self, RentalDataset};
use rental_data::report::{build_monthly_report, MonthlyReport, ReportOptions};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Rental report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Normalization: {}",
        settings.view,
        settings.format,
        settings.normalization_policy().name()
    );

    let data_path = bootstrap::discover_data_path(settings.data_path.as_deref())?;
    tracing::info!("Reading rental data from {}", data_path.display());

    let dataset = reader::load_rental_dataset(&data_path)?;
    let calendar = reader::load_machine_calendar(&data_path.join(reader::CALENDAR_FILE_NAME))?;

    let machine = match select_machine(&settings, &dataset) {
        Some(machine) => machine,
        None => anyhow::bail!(
            "No rental records could be parsed from {}",
            data_path.display()
        ),
    };

    match settings.view.as_str() {
        "actual" => run_actual_view(&settings, &dataset, &calendar, &machine)?,
        "forecast" => run_forecast_view(&settings, &dataset, &calendar, &machine)?,
        "both" => {
            run_actual_view(&settings, &dataset, &calendar, &machine)?;
            run_forecast_view(&settings, &dataset, &calendar, &machine)?;
        }
        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// The machine to report on: the explicit choice, or the first machine in
/// the actual set, falling back to the forecast set.
fn select_machine(settings: &Settings, dataset: &RentalDataset) -> Option<String> {
    if let Some(machine) = &settings.machine {
        return Some(machine.clone());
    }
    catalog::list_machines(&dataset.actual)
        .into_iter()
        .next()
        .or_else(|| catalog::list_machines(&dataset.forecast).into_iter().next())
}

/// Report observed counts; defaults to the most recent observed year.
fn run_actual_view(
    settings: &Settings,
    dataset: &RentalDataset,
    calendar: &SeasonalCalendar,
    machine: &str,
) -> Result<()> {
    let year = settings
        .year
        .or_else(|| catalog::list_years(&dataset.actual).last().copied());
    let year = match year {
        Some(year) => year,
        None => {
            tracing::warn!("No actual records loaded; skipping actual view");
            return Ok(());
        }
    };

    let options = ReportOptions {
        count_field: CountField::Observed,
        apply_calendar: settings.adjust_actual,
        adjustment: settings.adjustment_options(),
    };
    let report = build_monthly_report(&dataset.actual, machine, year, calendar, &options);
    emit_report(&report, &settings.format)
}

/// Report forecast counts; defaults to the earliest forecast year.
fn run_forecast_view(
    settings: &Settings,
    dataset: &RentalDataset,
    calendar: &SeasonalCalendar,
    machine: &str,
) -> Result<()> {
    let year = settings
        .year
        .or_else(|| catalog::list_years(&dataset.forecast).first().copied());
    let year = match year {
        Some(year) => year,
        None => {
            tracing::warn!("No forecast records loaded; skipping forecast view");
            return Ok(());
        }
    };

    let options = ReportOptions {
        count_field: CountField::Predicted,
        apply_calendar: settings.adjust_forecast(),
        adjustment: settings.adjustment_options(),
    };
    let report = build_monthly_report(&dataset.forecast, machine, year, calendar, &options);
    emit_report(&report, &settings.format)
}

/// Print the report to stdout in the requested output format.
fn emit_report(report: &MonthlyReport, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => println!("{}", table::render_report(report)),
    }
    Ok(())
}
