use booking_wizard::config::load_config;
use booking_wizard::core::totals::{format_currency_with, format_duration};
use booking_wizard::domain::ports::BookingApi;
use booking_wizard::utils::{logger, validation::Validate};
use booking_wizard::{
    app, BookingConfig, BookingError, BookingFlow, BookingPlan, Cli, Command, HttpBookingApi,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting booking-wizard");

    if let Err(e) = run(cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Booking failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), BookingError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        tracing::info!("🔧 API URL overridden to: {}", url);
        config = config.with_api_url(url);
    }

    // 驗證配置
    config.validate()?;
    tracing::debug!("Config: {:?}", config);

    let api = HttpBookingApi::new(&config)?;
    tracing::info!("🌐 Using booking API at {}", api.base_url());

    match cli.command {
        Command::Services => print_services(&api, &config).await,
        Command::AddOns => print_add_ons(&api, &config).await,
        Command::Slots { date } => {
            let slots = api.list_available_slots(date).await?;
            if slots.is_empty() {
                println!("No slots on {}", date);
            }
            for slot in slots {
                let marker = if slot.available { "✅" } else { "⛔" };
                println!("{} {}", marker, slot.time);
            }
            Ok(())
        }
        Command::Book { plan, dry_run } => book(api, &config, &plan, dry_run).await,
        Command::Lookup { code } => {
            let appointment = api.find_appointment(&code).await?;
            println!("🔖 {}", appointment.confirmation_code);
            if let (Some(date), Some(time)) =
                (&appointment.appointment_date, &appointment.appointment_time)
            {
                println!("📅 {} {}", date, time);
            }
            if let Some(status) = &appointment.status {
                println!("Status: {}", status);
            }
            if let Some(total) = appointment.total_price {
                println!("Total: {}", format_currency_with(total, config.currency_symbol()));
            }
            Ok(())
        }
    }
}

async fn print_services(api: &HttpBookingApi, config: &BookingConfig) -> Result<(), BookingError> {
    for service in api.list_services().await? {
        println!(
            "[{}] {} ({}, {}) {}",
            service.id,
            service.name,
            service.category.as_str(),
            format_duration(service.duration),
            format_currency_with(service.price, config.currency_symbol())
        );
    }
    Ok(())
}

async fn print_add_ons(api: &HttpBookingApi, config: &BookingConfig) -> Result<(), BookingError> {
    for add_on in api.list_add_ons().await? {
        println!(
            "[{}] {} (+{}) {}",
            add_on.id,
            add_on.name,
            format_duration(add_on.duration),
            format_currency_with(add_on.price, config.currency_symbol())
        );
    }
    Ok(())
}

async fn book(
    api: HttpBookingApi,
    config: &BookingConfig,
    plan_path: &std::path::Path,
    dry_run: bool,
) -> Result<(), BookingError> {
    tracing::info!("📁 Loading booking plan from: {}", plan_path.display());
    let plan = BookingPlan::from_file(plan_path)?;

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - the booking will not be submitted");
    }

    let mut flow = BookingFlow::new(api, config);
    let outcome = app::replay(&mut flow, &plan, dry_run).await?;

    println!("{}", outcome.summary.render(config.currency_symbol()));
    match outcome.confirmation_code {
        Some(code) => {
            tracing::info!("✅ Booking confirmed: {}", code);
            println!("✅ Booking confirmed! Confirmation code: {}", code);
        }
        None => println!("🔍 Dry run complete, nothing was submitted"),
    }
    Ok(())
}
