/*
[INPUT]:  Parsed subcommands
[OUTPUT]: Non-interactive and prompt-driven command flows
[POS]:    CLI module root
[UPDATE]: When adding subcommands
*/

pub mod init;
pub mod leaderboard;
