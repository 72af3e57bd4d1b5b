use anyhow::{anyhow, Result};
use clap::{crate_version, App as Cli, AppSettings, Arg, ArgMatches, SubCommand};
use log::*;
use trip_recruit::app::{parse_date, parse_place, App, ListOptions, RecruitOptions};
use trip_recruit::config::Config;
use trip_recruit::logger::{level_for_verbosity, CustomLogger};

fn main() -> Result<()> {
    let matches = Cli::new("trip-recruit")
        .version(crate_version!())
        .about("Browse and register group-trip recruitment posts")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("DIR")
                .global(true)
                .help("Use a custom configuration directory"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Increase log verbosity"),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Synchronize the list query with the address and fetch the list")
                .arg(Arg::with_name("url").long("url").value_name("QUERY").help("Initial address or query string"))
                .arg(Arg::with_name("page").long("page").value_name("N"))
                .arg(Arg::with_name("status").long("status").value_name("STATUS").help("all or open"))
                .arg(Arg::with_name("area").long("area").value_name("AREA"))
                .arg(Arg::with_name("sort").long("sort").value_name("SORT").help("latest or deadline"))
                .arg(Arg::with_name("search").long("search").value_name("TERM"))
                .arg(Arg::with_name("back").long("back").help("Navigate back once after applying the actions"))
                .arg(Arg::with_name("offline").long("offline").help("Do not fetch the list")),
        )
        .subcommand(
            SubCommand::with_name("recruit")
                .about("Edit the registration draft and optionally submit it")
                .arg(Arg::with_name("title").long("title").value_name("TITLE"))
                .arg(Arg::with_name("description").long("description").value_name("TEXT"))
                .arg(Arg::with_name("members").long("members").value_name("N"))
                .arg(Arg::with_name("departure").long("departure").value_name("YYYY-MM-DD"))
                .arg(Arg::with_name("deadline").long("deadline").value_name("YYYY-MM-DD"))
                .arg(
                    Arg::with_name("thumbnail")
                        .long("thumbnail")
                        .value_name("PATH|URL")
                        .conflicts_with("remove-thumbnail"),
                )
                .arg(Arg::with_name("remove-thumbnail").long("remove-thumbnail"))
                .arg(
                    Arg::with_name("place")
                        .long("place")
                        .value_name("NAME@ADDRESS")
                        .multiple(true)
                        .number_of_values(1),
                )
                .arg(Arg::with_name("edit").long("edit").value_name("ID").help("Edit an existing post"))
                .arg(Arg::with_name("submit").long("submit"))
                .arg(Arg::with_name("discard-draft").long("discard-draft").help("Start from an empty draft")),
        )
        .get_matches();

    let verbosity = matches
        .subcommand()
        .1
        .map_or(0, |args| args.occurrences_of("verbose"))
        .max(matches.occurrences_of("verbose"));
    CustomLogger::init(
        level_for_verbosity(verbosity),
        Box::new(|line: String| eprintln!("{}", line)),
    )?;

    let mut config = Config::new();
    config.load(matches.value_of("config"))?;
    let app = App::new(config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match matches.subcommand() {
        ("list", Some(args)) => {
            let report = runtime.block_on(app.list(list_options(args)))?;
            print!("{}", report);
        }
        ("recruit", Some(args)) => {
            let report = runtime.block_on(app.recruit(recruit_options(args)?))?;
            print!("{}", report);
        }
        (name, _) => return Err(anyhow!("Unknown command '{}'", name)),
    }
    debug!("Exiting...");
    Ok(())
}

fn owned(args: &ArgMatches, name: &str) -> Option<String> {
    args.value_of(name).map(str::to_owned)
}

fn list_options(args: &ArgMatches) -> ListOptions {
    ListOptions {
        url: owned(args, "url"),
        page: owned(args, "page"),
        status: owned(args, "status"),
        area: owned(args, "area"),
        sort: owned(args, "sort"),
        search: owned(args, "search"),
        back: args.is_present("back"),
        offline: args.is_present("offline"),
    }
}

fn recruit_options(args: &ArgMatches) -> Result<RecruitOptions> {
    Ok(RecruitOptions {
        title: owned(args, "title"),
        description: owned(args, "description"),
        members: owned(args, "members"),
        departure: args.value_of("departure").map(parse_date).transpose()?,
        deadline: args.value_of("deadline").map(parse_date).transpose()?,
        thumbnail: owned(args, "thumbnail"),
        remove_thumbnail: args.is_present("remove-thumbnail"),
        places: args
            .values_of("place")
            .map(|values| values.map(parse_place).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default(),
        edit: owned(args, "edit"),
        submit: args.is_present("submit"),
        discard_draft: args.is_present("discard-draft"),
    })
}
