use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use trip_matcher::calendar::BankHolidays;
use trip_matcher::detect::{DetectorConfig, Segment, StopLocator, extract_segments};
use trip_matcher::domain::{BoundingBox, DataError, StopCode, parse_date};
use trip_matcher::pipeline::{
    correlate_day, endpoint_stops, retain_local_journeys, retain_local_trips,
};
use trip_matcher::report::{
    JourneysDocument, MergedDocument, ReportError, RowsDocument, StopsDocument, TripsDocument,
    check_consistent, day_file, read_json, read_siri_dir, write_json, write_rows_file,
};
use trip_matcher::stops::{
    DirectoryConfig, StopCache, StopCacheConfig, StopClient, StopClientConfig, StopDirectory,
    StopError, StopTable,
};
use trip_matcher::telemetry::{assemble_tracks, assemble_trips};
use trip_matcher::timetable::{TimetableDocument, instantiate_day};

/// Roughly Bar Hill to Fulbourn.
const DEFAULT_BOUNDING_BOX: &str = "0.007896,52.155610,0.225048,52.267842";

#[derive(Parser, Debug)]
#[command(
    name = "trip-matcher",
    version,
    about = "Match timetabled bus journeys against vehicle position reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match one day's journeys to trips and write merged groups and rows
    Match(MatchArgs),
    /// Carve vehicle tracks into runs between two stops
    Segments(SegmentArgs),
}

#[derive(Args, Debug)]
struct StopArgs {
    /// Stops document to use instead of the stop directory API
    #[arg(long)]
    stops: Option<PathBuf>,

    /// Stop directory API base URL
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,

    /// Stop directory API token
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Area covered by the run, as min_lon,min_lat,max_lon,max_lat
    #[arg(long, env = "BOUNDING_BOX")]
    bounding_box: Option<BoundingBox>,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Day to process, as YYYY-MM-DD
    #[arg(value_parser = parse_date)]
    day: NaiveDate,

    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Distance in metres within which a vehicle counts as at a stop
    #[arg(long, default_value_t = DetectorConfig::default().threshold_m)]
    threshold_m: f64,

    /// Timetable document to instantiate instead of reading journeys
    #[arg(long)]
    timetable: Option<PathBuf>,

    /// Bank holiday table for timetable instantiation
    #[arg(long, requires = "timetable")]
    bank_holidays: Option<PathBuf>,

    /// Directory of SIRI-VM batches to assemble instead of reading trips
    #[arg(long)]
    siri_dir: Option<PathBuf>,

    #[command(flatten)]
    stops: StopArgs,
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Day the SIRI-VM batches cover, as YYYY-MM-DD
    #[arg(value_parser = parse_date)]
    day: NaiveDate,

    #[arg(long)]
    siri_dir: PathBuf,

    #[arg(long, value_parser = parse_stop)]
    origin: StopCode,

    #[arg(long, value_parser = parse_stop)]
    destination: StopCode,

    /// Only consider vehicles that served this line
    #[arg(long)]
    line: Option<String>,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    stops: StopArgs,
}

fn parse_stop(s: &str) -> Result<StopCode, DataError> {
    Ok(StopCode::parse(s)?)
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Stop(#[from] StopError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("requested {requested} but the documents are for {found}")]
    WrongDay { requested: NaiveDate, found: NaiveDate },

    #[error("no stops document given and API_TOKEN is not set")]
    MissingToken,

    #[error("stop {0} could not be located")]
    UnknownStop(StopCode),
}

#[derive(Debug, Serialize)]
struct SegmentsDocument<'a> {
    day: NaiveDate,
    origin: &'a StopCode,
    destination: &'a StopCode,
    segments: &'a [Segment],
}

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            err,
        );
        EnvFilter::new(default_level.to_string())
    });
    if let Err(e) = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init()
    {
        eprintln!("failed to install tracing subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Match(args) => run_match(args).await,
        Command::Segments(args) => run_segments(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_match(args: MatchArgs) -> Result<(), RunError> {
    let area = match args.stops.bounding_box {
        Some(bbox) => bbox,
        None => DEFAULT_BOUNDING_BOX.parse()?,
    };

    let journeys = match &args.timetable {
        Some(path) => {
            let timetable: TimetableDocument = read_json(path)?;
            let holidays = match &args.bank_holidays {
                Some(path) => read_json(path)?,
                None => BankHolidays::england_and_wales(),
            };
            JourneysDocument {
                day: args.day,
                bounding_box: area,
                journeys: instantiate_day(&timetable, args.day, &holidays),
            }
        }
        None => read_json(&day_file(&args.input_dir, "journeys", args.day, "json"))?,
    };

    let from_timetable = args.timetable.is_some();
    let from_siri = args.siri_dir.is_some();
    let trips = match &args.siri_dir {
        Some(dir) => {
            let records = read_siri_dir(dir)?;
            TripsDocument {
                day: args.day,
                bounding_box: journeys.bounding_box,
                trips: assemble_trips(&records),
            }
        }
        None => read_json(&day_file(&args.input_dir, "trips", args.day, "json"))?,
    };

    let (day, bbox) = check_consistent(&journeys, &trips)?;
    if day != args.day {
        return Err(RunError::WrongDay {
            requested: args.day,
            found: day,
        });
    }
    info!(
        day = %day,
        bounding_box = %bbox,
        journeys = journeys.journeys.len(),
        trips = trips.trips.len(),
        "Loaded day"
    );

    let wanted = endpoint_stops(&journeys.journeys, &trips.trips);
    let stops = load_stops(&args.stops, &args.output_dir, day, &bbox, &wanted).await?;
    write_json(
        &day_file(&args.output_dir, "stops", day, "json"),
        &StopsDocument {
            day,
            bounding_box: bbox,
            stops: stops.clone(),
        },
    )?;

    let journeys = if from_timetable {
        retain_local_journeys(journeys.journeys, &stops, &bbox)
    } else {
        journeys.journeys
    };
    let trips = if from_siri {
        retain_local_trips(trips.trips, &stops, &bbox)
    } else {
        trips.trips
    };

    let config = DetectorConfig::with_threshold(args.threshold_m);
    let output = correlate_day(journeys, trips, &stops, &config);

    write_json(
        &day_file(&args.output_dir, "merged", day, "json"),
        &MergedDocument {
            day,
            bounding_box: bbox,
            merged: &output.groups,
        },
    )?;
    write_rows_file(&day_file(&args.output_dir, "rows", day, "csv"), &output.rows)?;
    output.summary.log();
    write_json(
        &day_file(&args.output_dir, "rows", day, "json"),
        &RowsDocument {
            day,
            bounding_box: bbox,
            rows: output.rows,
            summary: Some(output.summary),
        },
    )?;

    Ok(())
}

async fn run_segments(args: SegmentArgs) -> Result<(), RunError> {
    let area = match args.stops.bounding_box {
        Some(bbox) => bbox,
        None => DEFAULT_BOUNDING_BOX.parse()?,
    };

    let wanted = [args.origin.clone(), args.destination.clone()];
    let stops = load_stops(&args.stops, &args.output_dir, args.day, &area, &wanted).await?;
    let origin = stops
        .locate(&args.origin)
        .ok_or_else(|| RunError::UnknownStop(args.origin.clone()))?;
    let destination = stops
        .locate(&args.destination)
        .ok_or_else(|| RunError::UnknownStop(args.destination.clone()))?;

    let records = read_siri_dir(&args.siri_dir)?;
    let tracks = assemble_tracks(&records);
    let segments = extract_segments(
        &tracks,
        origin,
        destination,
        args.line.as_deref(),
        &DetectorConfig::default(),
    );

    let name = format!("segments-{}-{}", args.origin, args.destination);
    write_json(
        &day_file(&args.output_dir, &name, args.day, "json"),
        &SegmentsDocument {
            day: args.day,
            origin: &args.origin,
            destination: &args.destination,
            segments: &segments,
        },
    )?;

    Ok(())
}

/// Stops from a stops document, or from the directory API for `bbox` plus
/// any `wanted` codes outside it.
async fn load_stops<'a>(
    args: &StopArgs,
    cache_dir: &Path,
    day: NaiveDate,
    bbox: &BoundingBox,
    wanted: impl IntoIterator<Item = &'a StopCode>,
) -> Result<StopTable, RunError> {
    if let Some(path) = &args.stops {
        let document: StopsDocument = read_json(path)?;
        if document.day != day {
            warn!(stops_day = %document.day, day = %day, "Stops document is for another day");
        }
        return Ok(document.stops);
    }

    let token = args.api_token.clone().ok_or(RunError::MissingToken)?;
    let mut client_config = StopClientConfig::new(token);
    if let Some(url) = &args.api_url {
        client_config = client_config.with_base_url(url);
    }
    let client = StopClient::new(client_config)?;
    let disk = StopCache::new(StopCacheConfig::new(cache_dir.join("stops_cache.json")));
    let directory = StopDirectory::new(client, Some(disk), &DirectoryConfig::default());

    let mut stops = directory.load_area(bbox).await?;
    directory.complete(&mut stops, wanted).await;
    Ok(stops)
}
