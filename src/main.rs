use clap::Parser;
use loki_control::app::controls::{display, rgb};
use loki_control::config::cli::{Command, DisplayCommand, FanCommand, RgbCommand, Switch};
use loki_control::domain::model::{FanProfile, RadioKind, RgbMode};
use loki_control::utils::{logger, validation::Validate};
use loki_control::{CliConfig, ControlCenter, ControlConfig, ControlError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let center = ControlCenter::with_daemon(config);

    if let Err(e) = run(&center, cli.command).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.exit_code().max(1));
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> Result<ControlConfig, ControlError> {
    let mut config = ControlConfig::load_or_default(&cli.config)?;
    if let Some(socket) = &cli.socket {
        config.client.socket_path = socket.clone();
        tracing::debug!("🔧 Socket overridden to: {}", socket);
    }
    config.validate()?;
    Ok(config)
}

async fn run(center: &ControlCenter, command: Command) -> Result<(), ControlError> {
    match command {
        Command::Status => {
            println!("{}", center.status().await);
        }
        Command::Wifi => center.toggle_radio(RadioKind::Wifi).await?,
        Command::Bluetooth => center.toggle_radio(RadioKind::Bluetooth).await?,
        Command::Airplane { state } => center.set_airplane(state == Switch::On).await?,
        Command::Brightness { percent } => {
            let raw = center.set_brightness(f64::from(percent)).await?;
            println!("☀️ Brightness {}% (raw {})", percent, raw);
        }
        Command::Volume { percent } => {
            center.set_volume(percent).await?;
            println!("🔊 Volume {}%", percent);
        }
        Command::Mute => center.toggle_mute().await?,
        Command::Display(DisplayCommand::List) => {
            let output = center.display_modes().await?;
            println!("{}", output.name);
            for (w, h) in display::resolutions(&output.modes) {
                let rates: Vec<String> = display::refresh_rates(&output.modes, w, h)
                    .into_iter()
                    .map(display::format_refresh)
                    .collect();
                println!("  {}x{}: {}", w, h, rates.join(", "));
            }
        }
        Command::Display(DisplayCommand::Set(args)) => {
            let mode = center.set_display(&args.resolution, args.refresh).await?;
            println!("🖥️ {}", display::mode_argument(&mode));
        }
        Command::Tdp { watts } => {
            let applied = center.set_tdp(watts).await?;
            println!("⚡ TDP {} W", applied);
        }
        Command::Fan(fan) => run_fan(center, fan).await?,
        Command::Rgb(rgb_command) => {
            let mode = match rgb_command {
                RgbCommand::Off => RgbMode::Off,
                RgbCommand::Breathe => RgbMode::Breathe,
                RgbCommand::Manual { hue, brightness } => {
                    let colour = rgb::preview(hue, brightness);
                    println!("💡 Preview colour: {}", colour);
                    RgbMode::Manual { hue, brightness }
                }
            };
            center.set_rgb(mode).await?;
        }
    }
    Ok(())
}

async fn run_fan(center: &ControlCenter, command: FanCommand) -> Result<(), ControlError> {
    let profile = match command {
        FanCommand::Auto => FanProfile::Auto,
        FanCommand::Quiet => FanProfile::Quiet,
        FanCommand::Aggressive => FanProfile::Aggressive,
        FanCommand::Manual { percent } => FanProfile::Manual(f32::from(percent)),
    };

    let controller = center.fan_controller().await?;
    controller.set_profile(profile).await?;

    if matches!(profile, FanProfile::Quiet | FanProfile::Aggressive) {
        println!("🌀 Running {} fan curve, press Ctrl-C to hand control back", profile);
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        }
        // 結束前交還韌體控制，避免風扇停在最後的 PWM
        controller.set_profile(FanProfile::Auto).await?;
    } else {
        println!("🌀 Fan profile: {}", profile);
    }

    controller.shutdown().await;
    Ok(())
}
