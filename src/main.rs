use beach_planner::booking::scheduler::{reapply_practices, reapply_tournaments};
use beach_planner::booking::store::BookingStore;
use beach_planner::config::{horizon_from_env, DataFiles};
use beach_planner::display::{print_day, print_reapply_summary};
use beach_planner::roster::{load_practices, load_tournaments};
use beach_planner::web::start_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let files = DataFiles::from_env();
    let horizon = horizon_from_env();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        println!("Starting web server on port {}...", port);
        println!("Data directory: {}", files.dir.display());
        println!("Access the site at http://localhost:{}", port);

        start_server(port, files, horizon).await?;
        return Ok(());
    }

    // CLI mode: re-derive the booking document from the rosters, then show
    // today's grid.
    println!("Loading rosters from {}...", files.dir.display());
    let practices = load_practices(&files.practices())?;
    let tournaments = load_tournaments(&files.tournaments())?;
    println!(
        "Loaded {} practice definitions and {} tournaments",
        practices.len(),
        tournaments.len()
    );

    let mut store = BookingStore::load(&files.bookings())?;
    let practice_summary = reapply_practices(&mut store, &practices, &horizon);
    let tournament_summary = reapply_tournaments(&mut store, &tournaments);
    store.save(&files.bookings())?;

    print_reapply_summary(&practice_summary, &tournament_summary);
    print_day(&store, chrono::Local::now().date_naive());

    Ok(())
}
