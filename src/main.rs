use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use raylib::prelude::*;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use maze_explorer::audio_manager::AudioManager;
use maze_explorer::config::{GameConfig, DEFAULT_CONFIG_PATH};
use maze_explorer::core::process_events::process_events;
use maze_explorer::core::session::{Session, SessionEvent};
use maze_explorer::render::camera::{Camera, Viewpoint};
use maze_explorer::render::framebuffer::Framebuffer;
use maze_explorer::render::minimap::draw_minimap;
use maze_explorer::render::render3d::{draw_crosshair, render_frame};

/// First-person maze explorer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file (RON).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seed for the first maze. Defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,

    /// Maze width override.
    #[arg(long)]
    width: Option<usize>,

    /// Maze height override.
    #[arg(long)]
    height: Option<usize>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, config, std::io::stderr()).context("failed to install logger")
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    let result = run();
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut config = GameConfig::load_or_default(&args.config);
    if let Some(width) = args.width {
        config.maze.width = width;
    }
    if let Some(height) = args.height {
        config.maze.height = height;
    }
    config.validate().context("invalid configuration")?;

    let seed = args.seed.unwrap_or_else(time_seed);
    log::info!("Starting with seed {seed}");

    let (window_width, window_height) = (config.window.width, config.window.height);
    let (mut window, raylib_thread) = raylib::init()
        .size(window_width as i32, window_height as i32)
        .title("Maze Explorer")
        .build();
    window.set_target_fps(config.window.target_fps);
    window.set_exit_key(None);
    window.disable_cursor();

    let mut framebuffer = Framebuffer::new(window_width, window_height);
    let image = Image::gen_image_color(window_width as i32, window_height as i32, Color::BLACK);
    let mut texture = window
        .load_texture_from_image(&raylib_thread, &image)
        .map_err(|e| anyhow!("failed to create framebuffer texture: {e}"))?;

    let audio = AudioManager::new();
    match &audio {
        Some(_) => log::debug!("Audio output ready"),
        None => log::warn!("No audio device, sound disabled"),
    }
    let mut audio = audio;
    if let Some(audio) = audio.as_mut() {
        audio.load_cues_auto();
    }

    let camera = Camera::new(&config.camera);
    let render_config = config.render.clone();
    let mut session = Session::new(config, seed);

    loop {
        let intents = process_events(&window);
        if intents.quit {
            break;
        }
        let dt = window.get_frame_time().min(0.1);
        let events = session.update(&intents, dt);
        if let Some(audio) = &audio {
            audio.play_events(&events);
        }
        if events.contains(&SessionEvent::GameOver) {
            window.enable_cursor();
        }

        let player = &session.player;
        let eye = Viewpoint::new(player.position, player.yaw, player.pitch);
        render_frame(&mut framebuffer, &session.level, &eye, &camera, &render_config);
        draw_crosshair(&mut framebuffer, Color::WHITE);
        draw_minimap(&mut framebuffer, &session.level, player, render_config.minimap_size);
        framebuffer.upload_to_texture(&mut texture);

        let fps = window.get_fps();
        let mut d = window.begin_drawing(&raylib_thread);
        d.clear_background(Color::BLACK);
        d.draw_texture(&texture, 0, 0, Color::WHITE);
        draw_hud(&mut d, &session, fps);
    }

    log::info!("Session finished\n{}", session.stats.summary());
    Ok(())
}

fn draw_hud(d: &mut RaylibDrawHandle, session: &Session, fps: u32) {
    let player = &session.player;
    let lines = [
        format!("HP {}/{}   Level {}   EXP {}", player.hp, player.max_hp, player.level, player.experience),
        format!("Points {}   Weapon {} (+{})", session.stats.points, player.weapon.name(), player.weapon_upgrades),
        format!("Sensitivity {:.2}   FPS {fps}", session.sensitivity),
    ];
    for (i, line) in lines.iter().enumerate() {
        d.draw_text(line, 10, 10 + i as i32 * 22, 20, Color::WHITE);
    }

    let chances = session
        .win_chances()
        .iter()
        .map(|(kind, chance)| format!("{} {chance}%", kind.name()))
        .collect::<Vec<_>>()
        .join("  ");
    d.draw_text(&chances, 10, 76, 18, Color::LIGHTGRAY);

    let base_y = d.get_screen_height() - 30;
    for (i, message) in session.messages.iter().rev().enumerate() {
        d.draw_text(&message.text, 10, base_y - i as i32 * 24, 20, Color::YELLOW);
    }

    if session.is_over() {
        let (w, h) = (d.get_screen_width(), d.get_screen_height());
        d.draw_text("GAME OVER", w / 2 - 120, h / 2 - 30, 48, Color::RED);
        d.draw_text("Press Esc to quit", w / 2 - 90, h / 2 + 30, 20, Color::WHITE);
    }
}
