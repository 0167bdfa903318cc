extern crate clap;
extern crate env_logger;
extern crate geoquiz;
#[macro_use]
extern crate log;
extern crate termion;

use std::error::Error;
use std::time::SystemTime;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use termion::color;

use geoquiz::config::Config;
use geoquiz::ledger::{self, GameResult, LedgerEntry};
use geoquiz::region::display_name;
use geoquiz::store::SessionStore;
use geoquiz::{
    build_deck, GameType, GameplaySession, QuizError, QuizMode, RegionCatalog, SystemClock,
};

// QuizError and everything it wraps, one cause per line
fn describe(err: QuizError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    message
}

fn session_arg() -> Arg<'static, 'static> {
    Arg::with_name("session")
        .short("s")
        .long("session")
        .help("Session id printed by `new`")
        .takes_value(true)
        .required(true)
}

fn card_arg() -> Arg<'static, 'static> {
    Arg::with_name("card")
        .short("c")
        .long("card")
        .help("Card id, e.g. gameplay-card-3")
        .takes_value(true)
        .required(true)
}

fn subregion_arg() -> Arg<'static, 'static> {
    Arg::with_name("subregion")
        .short("r")
        .long("subregion")
        .help("Subregion id, e.g. subregion_7")
        .takes_value(true)
        .required(true)
}

fn highlight<T: std::fmt::Display>(label: &str, value: T) {
    println!(
        "{}{}:{} {}",
        color::Fg(color::Blue),
        label,
        color::Fg(color::Reset),
        value
    );
}

fn new_game(config: &Config, store: &SessionStore, matches: &ArgMatches) -> Result<(), QuizError> {
    let region_path = matches.value_of("region").unwrap_or_default();
    let mode: QuizMode = matches.value_of("mode").unwrap_or("name").parse()?;
    let game_type: GameType = matches.value_of("type").unwrap_or("test").parse()?;

    let catalog = RegionCatalog::scan(&config.data_dir)?;
    let region = catalog.load(region_path)?;
    if !region.supports(mode) {
        warn!(
            "{} does not list {} data for its subregions, some cards may be blank",
            region.name, mode
        );
    }
    let deck = build_deck(region.subregions(), mode, region_path);
    let session = GameplaySession::new(region_path, game_type, deck);
    let id = store.create(&session)?;

    println!(
        "New {} {} game of {} with {} cards",
        game_type,
        mode,
        display_name(region_path),
        session.cards().len()
    );
    let kind = region
        .properties
        .subregion_type
        .as_ref()
        .map_or("subregion", |kind| kind.as_str());
    highlight("Map", format!("{} x {}", region.subregions().len(), kind));
    highlight("Session", id);
    Ok(())
}

fn show_board(session: &GameplaySession) {
    println!("{}Subregions{}", color::Fg(color::Green), color::Fg(color::Reset));
    let mut names: Vec<(&String, &String)> = session.subregion_ids().iter().collect();
    names.sort();
    for (name, id) in names {
        println!("\t{:<16} {}", id, name);
    }
    println!("{}Cards{}", color::Fg(color::Green), color::Fg(color::Reset));
    for card in session.open_cards() {
        match card.img_url {
            Some(ref url) => println!("\t{:<20} [flag] {}", card.id, url),
            None => println!("\t{:<20} {}", card.id, card.content),
        }
    }
}

fn show_status(session: &GameplaySession) {
    let info = session.summary(&SystemClock);
    highlight("Region", display_name(session.region_path()));
    highlight("Mode", format!("{} ({})", session.mode(), session.game_type()));
    highlight("Remaining", session.remaining());
    highlight("Correct", format!("{} of {} attempts", info.correct, session.attempts()));
    highlight("Time", format!("{}s", info.seconds));
    if !session.is_started() {
        println!("Not started yet");
    } else if session.is_paused() {
        println!("Paused");
    }
}

fn finish_game(
    config: &Config,
    store: &SessionStore,
    session_id: &str,
) -> Result<(), QuizError> {
    let session = store.load(session_id)?;
    if !session.is_over() {
        return Err(QuizError::GameNotFinished(session.remaining()));
    }
    let grader = config.grader()?;
    let info = session.summary(&SystemClock);
    let grade = grader.calc_grade(&info);

    println!(
        "{}Victory!{} {}",
        color::Fg(color::Green),
        color::Fg(color::Reset),
        display_name(session.region_path())
    );
    highlight("Correct", format!("{} ({}%)", info.correct, info.correct_percentage));
    highlight("Incorrect", info.incorrect);
    highlight("Time", format!("{}s", info.seconds));
    highlight("Grade", format!("{} - {}", grade.grade, grade.rank));
    if let Some(ref next) = grade.next_grade {
        let mut needs = vec![];
        if let Some(score) = grade.score_req {
            needs.push(format!("{}% correct", score));
        }
        if let Some(time) = grade.time_req {
            needs.push(format!("{}s or less", time));
        }
        highlight(&format!("Next grade {}", next), needs.join(", "));
    }

    let entry = LedgerEntry::GameResult(GameResult {
        region_path: session.region_path().to_string(),
        mode: session.mode(),
        game_type: session.game_type(),
        finished: SystemTime::now(),
        info,
        grade: grade.grade,
    });
    ledger::append_to_ledger(&entry, &config.ledger_path)?;
    store.destroy(session_id)
}

fn show_passport(config: &Config) -> Result<(), QuizError> {
    let grader = config.grader()?;
    let entries = ledger::read_ledger(&config.ledger_path)?;
    let passport = ledger::best_grades(&entries, &grader);
    if passport.is_empty() {
        println!("No stamps yet, finish a game to earn one!");
    }
    for ((region_path, mode), stamp) in passport {
        println!(
            "\t{}{:<3}{} {:<24} {:<10} best {}% over {} plays",
            color::Fg(color::Red),
            stamp.grade,
            color::Fg(color::Reset),
            display_name(&region_path),
            mode,
            stamp.best_percentage,
            stamp.plays
        );
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), QuizError> {
    let config = Config::from_args(
        matches.value_of("data-dir"),
        matches.value_of("session-dir"),
        matches.value_of("ledger"),
        matches.value_of("grades"),
    );
    debug!("Config: {:?}", config);
    let store = SessionStore::open(&config.session_dir)?;
    let clock = SystemClock;

    match matches.subcommand() {
        ("regions", _) => {
            let catalog = RegionCatalog::scan(&config.data_dir)?;
            for region_path in catalog.playable() {
                println!("\t{:<40} {}", region_path, display_name(region_path));
            }
        }
        ("new", Some(matches)) => new_game(&config, &store, matches)?,
        ("board", Some(matches)) => {
            let session = store.load(matches.value_of("session").unwrap_or_default())?;
            show_board(&session);
        }
        ("start", Some(matches)) => {
            store.with_session(matches.value_of("session").unwrap_or_default(), |session| {
                session.start(&clock)
            })?;
            println!("Go!");
        }
        ("check", Some(matches)) => {
            let card_id = matches.value_of("card").unwrap_or_default();
            let subregion_id = matches.value_of("subregion").unwrap_or_default();
            let outcome = store.with_session(matches.value_of("session").unwrap_or_default(), |session| {
                session.check(card_id, subregion_id)
            })?;
            if outcome.correct {
                println!("{}Correct!{}", color::Fg(color::Green), color::Fg(color::Reset));
            } else {
                println!("{}Incorrect{}", color::Fg(color::Red), color::Fg(color::Reset));
            }
            if outcome.victory {
                println!("All cards placed, run `finish` for your grade");
            }
        }
        ("verify", Some(matches)) => {
            let session = store.load(matches.value_of("session").unwrap_or_default())?;
            if !session.game_type().allows_verify() {
                println!("Hints are not available in {} games", session.game_type());
                return Ok(());
            }
            let correct = session.verify(
                matches.value_of("card").unwrap_or_default(),
                matches.value_of("subregion").unwrap_or_default(),
            );
            println!("{}", if correct { "Yes" } else { "No" });
        }
        ("reveal", Some(matches)) => {
            let session = store.load(matches.value_of("session").unwrap_or_default())?;
            if !session.game_type().allows_reveal() {
                println!("Answers are only revealed in learn games");
                return Ok(());
            }
            match session.subregion_id_for_card(matches.value_of("card").unwrap_or_default()) {
                Some(subregion_id) => highlight("Subregion", subregion_id),
                None => println!("No such card"),
            }
        }
        ("skip", Some(matches)) => {
            let card_id = matches.value_of("card").unwrap_or_default();
            let outcome = store.with_session(matches.value_of("session").unwrap_or_default(), |session| {
                session.skip(card_id)
            })?;
            if outcome.victory {
                println!("All cards placed, run `finish` for your grade");
            }
        }
        ("pause", Some(matches)) => {
            store.with_session(matches.value_of("session").unwrap_or_default(), |session| {
                session.pause(&clock)
            })?;
        }
        ("unpause", Some(matches)) => {
            store.with_session(matches.value_of("session").unwrap_or_default(), |session| {
                session.unpause(&clock)
            })?;
        }
        ("status", Some(matches)) => {
            let session = store.load(matches.value_of("session").unwrap_or_default())?;
            show_status(&session);
        }
        ("finish", Some(matches)) => {
            finish_game(&config, &store, matches.value_of("session").unwrap_or_default())?
        }
        ("passport", _) => show_passport(&config)?,
        _ => (),
    }
    Ok(())
}

fn main() -> Result<(), String> {
    env_logger::init();

    let matches = App::new("GeoQuiz Local")
        .version("0.1")
        .author("Scott Moeller <electronjoe@gmail.com>")
        .about("Command line map quiz storing sessions to local JSON files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .help("Directory of region data (env GEOQUIZ_DATA_DIR)")
                .takes_value(true),
        ).arg(
            Arg::with_name("session-dir")
                .long("session-dir")
                .help("Directory for games in progress (env GEOQUIZ_SESSION_DIR)")
                .takes_value(true),
        ).arg(
            Arg::with_name("ledger")
                .long("ledger")
                .help("Passport ledger of finished games (env GEOQUIZ_LEDGER)")
                .takes_value(true),
        ).arg(
            Arg::with_name("grades")
                .long("grades")
                .help("JSON grade table (env GEOQUIZ_GRADES)")
                .takes_value(true),
        ).subcommand(SubCommand::with_name("regions").about("Lists playable regions"))
        .subcommand(
            SubCommand::with_name("new")
                .about("Starts a new game session")
                .arg(
                    Arg::with_name("region")
                        .long("region")
                        .help("Region path, as listed by `regions`")
                        .takes_value(true)
                        .required(true),
                ).arg(
                    Arg::with_name("mode")
                        .short("m")
                        .long("mode")
                        .help("What to quiz")
                        .possible_values(&["name", "capital", "leader", "flag", "landmarks"])
                        .default_value("name"),
                ).arg(
                    Arg::with_name("type")
                        .short("t")
                        .long("type")
                        .help("How much help to give")
                        .possible_values(&["learn", "train", "test"])
                        .default_value("test"),
                ),
        ).subcommand(
            SubCommand::with_name("board")
                .about("Shows subregion ids and the cards still to place")
                .arg(session_arg()),
        ).subcommand(
            SubCommand::with_name("start")
                .about("Starts the game clock")
                .arg(session_arg()),
        ).subcommand(
            SubCommand::with_name("check")
                .about("Places a card on a subregion")
                .arg(session_arg())
                .arg(card_arg())
                .arg(subregion_arg()),
        ).subcommand(
            SubCommand::with_name("verify")
                .about("Asks whether a card belongs to a subregion without placing it")
                .arg(session_arg())
                .arg(card_arg())
                .arg(subregion_arg()),
        ).subcommand(
            SubCommand::with_name("reveal")
                .about("Shows which subregion a card belongs to")
                .arg(session_arg())
                .arg(card_arg()),
        ).subcommand(
            SubCommand::with_name("skip")
                .about("Gives up on a card")
                .arg(session_arg())
                .arg(card_arg()),
        ).subcommand(
            SubCommand::with_name("pause")
                .about("Stops the game clock")
                .arg(session_arg()),
        ).subcommand(
            SubCommand::with_name("unpause")
                .about("Restarts the game clock")
                .arg(session_arg()),
        ).subcommand(
            SubCommand::with_name("status")
                .about("Shows progress of a game")
                .arg(session_arg()),
        ).subcommand(
            SubCommand::with_name("finish")
                .about("Grades a finished game and stamps the passport")
                .arg(session_arg()),
        ).subcommand(SubCommand::with_name("passport").about("Shows best grades per region"))
        .get_matches();

    run(&matches).map_err(describe)
}
