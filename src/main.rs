use crossterm::style::Stylize;
use member_admin::config::config::Config;
use member_admin::services::data_loader_service::DataSource;
use std::io;
use std::path::PathBuf;

fn print_help() {
    println!("{}", "Member Admin - paginated member table".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  member-admin [OPTIONS] [FILE.json]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}        - Load members from URL", "--url <URL>".green());
    println!("  {}          - Use the line-based console", "--classic".green());
    println!(
        "  {} - Generate config file with defaults",
        "--generate-config".green()
    );
    println!("  {}             - Show this help", "--help".green());
    println!();
    println!("{}", "Without a file or --url the configured source URL is used.".dark_grey());
}

fn generate_config() -> io::Result<()> {
    match Config::get_config_path() {
        Ok(path) => {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }
            if let Err(e) = std::fs::write(&path, Config::create_default_with_comments()) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }
            println!("Configuration file created at: {:?}", path);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error determining config path: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() -> io::Result<()> {
    // Initialize unified logging (tracing + dual logging)
    member_admin::utils::logging::init_tracing_with_dual_logging();

    if let Some(dual_logger) = member_admin::utils::dual_logging::get_dual_logger() {
        eprintln!("📝 Logs will be written to:");
        eprintln!("   {}", dual_logger.log_path().display());
        eprintln!();
    }

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        return generate_config();
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error loading config, using defaults: {:#}", e);
        Config::default()
    });

    let url_flag = args
        .iter()
        .position(|arg| arg == "--url")
        .and_then(|pos| args.get(pos + 1))
        .cloned();

    let data_file = args
        .iter()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .find(|arg| arg.ends_with(".json"))
        .map(PathBuf::from);

    let source = match (url_flag, data_file) {
        (Some(url), _) => DataSource::Url(url),
        (None, Some(path)) => DataSource::File(path),
        (None, None) => DataSource::Url(config.source.url.clone()),
    };

    let result = if args.contains(&"--classic".to_string()) {
        member_admin::classic::run_classic(config, source)
    } else {
        member_admin::ui::tui_app::run_tui_app(config, source)
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
