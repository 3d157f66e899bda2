use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn run_flags_parse() {
    let cli = Cli::parse_from([
        "sf",
        "run",
        "--dry-run",
        "--limit",
        "100",
        "--if-exists",
        "append",
    ]);
    match cli.command {
        Commands::Run(args) => {
            assert!(args.dry_run);
            assert_eq!(args.limit, Some(100));
            assert_eq!(args.if_exists, IfExists::Append);
            assert!(!args.no_load);
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn if_exists_maps_to_write_mode() {
    assert_eq!(WriteMode::from(IfExists::Fail), WriteMode::Fail);
    assert_eq!(WriteMode::from(IfExists::Replace), WriteMode::Replace);
    assert_eq!(WriteMode::from(IfExists::Append), WriteMode::Append);
}
