//! orbcompare viewer - Terminal User Interface
//!
//! Form on the left, playback canvas on the right. App logic lives in
//! `orbcompare::tui::viewer_app`.

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::process::ExitCode {
    use clap::Parser;
    use orbcompare::cli::load_config;
    use orbcompare::session::HttpPredictionService;
    use orbcompare::tui::viewer_app::ViewerApp;
    use std::process::ExitCode;

    let cli = tui::Cli::parse();
    if let Err(e) = orbcompare::init_file_logging(&cli.log_file) {
        eprintln!("Error: cannot open log file {}: {e}", cli.log_file.display());
        return ExitCode::from(1);
    }

    let setup = load_config(cli.config.as_deref()).and_then(|mut config| {
        if let Some(endpoint) = &cli.endpoint {
            config.service.endpoint.clone_from(endpoint);
            config.check()?;
        }
        let service = HttpPredictionService::new(config.service.endpoint.clone(), config.request_timeout())?;
        Ok((config, service))
    });
    let (config, service) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    tracing::info!(endpoint = %config.service.endpoint, "viewer starting");
    let app = ViewerApp::new(service, &config);
    match tui::run(app, config.frame_interval()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use orbcompare::orbit::render::{Color as Rgba, DrawingSurface, RenderCommand};
    use orbcompare::session::PredictionService;
    use orbcompare::tui::viewer_app::{AppAction, Field, ViewerApp};
    use ratatui::{
        backend::{Backend, CrosstermBackend},
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{
            canvas::{Canvas, Circle, Line as CanvasLine},
            Block, Borders, Clear, Paragraph, Wrap,
        },
        Frame, Terminal,
    };
    use std::io;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    /// Viewer arguments.
    #[derive(Debug, clap::Parser)]
    #[command(name = "orbit_viewer", version)]
    #[command(about = "Interactive physics vs. ML trajectory viewer")]
    pub struct Cli {
        /// Configuration file to load
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Override the prediction service endpoint
        #[arg(long)]
        pub endpoint: Option<String>,

        /// Log destination (the terminal is owned by the UI)
        #[arg(long, default_value = "orbit_viewer.log")]
        pub log_file: PathBuf,
    }

    /// Run the TUI application on a single-threaded runtime.
    pub fn run<P: PredictionService + 'static>(
        app: ViewerApp<P>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let local = tokio::task::LocalSet::new();

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = local.block_on(&runtime, event_loop(&mut terminal, app, tick_rate));

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend, P: PredictionService + 'static>(
        terminal: &mut Terminal<B>,
        mut app: ViewerApp<P>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        loop {
            let start = Instant::now();
            terminal.draw(|f| ui(f, &app))?;

            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if let Some(AppAction::Simulate(input)) = app.handle_key(key.code) {
                        let simulation = app.simulation(input);
                        // Outcome is logged and alerted by the session.
                        tokio::task::spawn_local(async move {
                            let _ = simulation.await;
                        });
                    }
                }
            }

            if app.should_quit {
                break;
            }

            app.update();
            tokio::time::sleep(tick_rate.saturating_sub(start.elapsed())).await;
        }
        Ok(())
    }

    fn ui<P: PredictionService>(f: &mut Frame, app: &ViewerApp<P>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(10)])
            .split(f.area());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(20)])
            .split(rows[1]);

        render_title(f, rows[0]);
        render_form(f, cols[0], app);
        render_canvas(f, cols[1], app);

        if let Some(message) = app.alert() {
            render_alert(f, &message);
        }
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                " ORBCOMPARE ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled("physics", Style::default().fg(tui_color(Rgba::PHYSICS))),
            Span::raw(" vs "),
            Span::styled("ML", Style::default().fg(tui_color(Rgba::ML))),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls: [Tab] Field  [Enter/F5] Simulate  [Q] Quit"),
        );
        f.render_widget(title, area);
    }

    fn render_form<P: PredictionService>(f: &mut Frame, area: Rect, app: &ViewerApp<P>) {
        let mut lines: Vec<Line> = Field::ALL
            .iter()
            .map(|&field| {
                let focused = field == app.focus;
                let style = if focused {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!("{:<10}", field.label()), Style::default().fg(Color::Gray)),
                    Span::styled(format!(" {:<12}", app.field(field)), style),
                ])
            })
            .collect();

        let trigger = app.trigger();
        let button_style = if trigger.is_enabled() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(format!("[ {} ]", trigger.label()), button_style)));

        if let Some(handle) = app.animation() {
            let state = handle.state();
            lines.push(Line::raw(""));
            lines.push(Line::from(format!(
                "Frame {}/{} {:?}",
                state.frames_composed,
                handle.frames(),
                state.phase
            )));
        }

        let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Initial state"));
        f.render_widget(form, area);
    }

    fn render_canvas<P: PredictionService>(f: &mut Frame, area: Rect, app: &ViewerApp<P>) {
        let surface = app.surface();
        let size = surface.size();
        let flip = |y: f64| size.height - y;

        let background = surface
            .commands()
            .iter()
            .find_map(|cmd| match cmd {
                RenderCommand::Clear { color } => Some(tui_color(*color)),
                _ => None,
            })
            .unwrap_or(Color::Black);

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title("Trajectories"))
            .background_color(background)
            .x_bounds([0.0, size.width])
            .y_bounds([0.0, size.height])
            .paint(|ctx| {
                for cmd in surface.commands() {
                    match cmd {
                        RenderCommand::Clear { .. } => {}
                        RenderCommand::StrokePath { points, color, .. } => {
                            let color = tui_color(*color);
                            for pair in points.windows(2) {
                                ctx.draw(&CanvasLine {
                                    x1: pair[0].0,
                                    y1: flip(pair[0].1),
                                    x2: pair[1].0,
                                    y2: flip(pair[1].1),
                                    color,
                                });
                            }
                        }
                        RenderCommand::FillCircle {
                            x,
                            y,
                            radius,
                            color,
                        } => {
                            ctx.draw(&Circle {
                                x: *x,
                                y: flip(*y),
                                radius: *radius,
                                color: tui_color(*color),
                            });
                        }
                    }
                }
            });
        f.render_widget(canvas, area);
    }

    fn render_alert(f: &mut Frame, message: &str) {
        let area = centered(f.area(), 50, 7);
        let alert = Paragraph::new(vec![
            Line::from(message.to_string()),
            Line::raw(""),
            Line::from(Span::styled("[Enter] OK", Style::default().fg(Color::Cyan))),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Simulation failed")
                .style(Style::default().fg(Color::Red)),
        );
        f.render_widget(Clear, area);
        f.render_widget(alert, area);
    }

    fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }

    /// Terminal color for a render color; translucency is blended over black.
    fn tui_color(color: Rgba) -> Color {
        let c = color.premultiplied();
        Color::Rgb(c.r, c.g, c.b)
    }
}
