use std::process::ExitCode;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};

use filtertable::cli::Cli;
use filtertable::controller::Controller;
use filtertable::domain::Message;
use filtertable::model::{Model, Status};
use filtertable::ui::TableUI;
use filtertable::{FilterContext, FilterError, TableBinding, Theme, loader, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Err(e) => {
            error!("{e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(cli: Cli) -> Result<(), FilterError> {
    logging::init(cli.log_path()?, cli.log_level)?;
    info!("Starting ft!");

    let config = cli.config();
    let mut ctx = FilterContext::new();
    ctx.init(Theme::default());

    let table = loader::load_data_file(&cli.data_path()?)?;
    let spec = cli.table_spec(&table.name, &table.headers)?;
    let searches = cli.text_searches(&table.name, &table.headers);
    let binding = TableBinding::new(&ctx, &spec, &table.rows, &searches)?;

    let ui = TableUI::new(ctx.theme().cloned().unwrap_or_default());
    let controller = Controller::new(&config);

    // Sized for real on the first resize
    let model = Model::new(binding, table, &config, 0, 0);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &ui, &controller, model);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    ui: &TableUI,
    controller: &Controller,
    mut model: Model,
) -> Result<(), FilterError> {
    let size = terminal.size()?;
    model.update(Message::Resize(size.width as usize, size.height as usize))?;

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        };
    }
    Ok(())
}
