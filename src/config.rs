//! Command line and interactive configuration
//!
//! The thread count always comes from the command line. The rest is asked
//! for on stdin, one question at a time, unless the matching flag was given.

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use clap::{Parser, ValueEnum};

use crate::error::{BenchError, Result};
use crate::workload::OpMix;

/// Sorted linked list benchmark: pthread rwlock vs. our own writer-preferring one
#[derive(Parser, Debug, Clone)]
#[command(name = "rwlist")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Number of worker threads
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub thread_count: u32,

    /// Reader-writer lock implementation to benchmark
    #[arg(short = 'l', long = "lock", value_enum, default_value_t = LockChoice::Pthread)]
    pub lock: LockChoice,

    /// Keys to insert from the main thread before the run (skips the prompt)
    #[arg(long = "main-inserts")]
    pub inserts: Option<u64>,

    /// Total operations over all threads (skips the prompt)
    #[arg(long = "ops")]
    pub ops: Option<u64>,

    /// Fraction of operations that are searches (skips the prompt)
    #[arg(long = "search")]
    pub search: Option<f64>,

    /// Fraction of operations that are inserts (skips the prompt)
    #[arg(long = "insert")]
    pub insert: Option<f64>,

    /// Offset added to every random seed
    #[arg(long = "seed", default_value_t = 0)]
    pub seed: u64,

    /// Print the list before and after the run
    #[arg(long = "show-list")]
    pub show_list: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LockChoice {
    /// The platform's pthread_rwlock_t
    Pthread,
    /// Our condvar-based, writer-preferring lock
    Custom,
    /// Both, one after the other, from identical starting lists
    Both,
}

/// Complete, validated benchmark configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub threads: usize,
    pub inserts_in_main: u64,
    pub total_ops: u64,
    pub mix: OpMix,
    pub lock: LockChoice,
    pub seed: u64,
    pub show_list: bool,
}

impl BenchConfig {
    /// Builds the config from `args`, asking `prompter` for anything missing.
    pub fn from_cli<R: BufRead, W: Write>(args: &CliArgs, prompter: &mut Prompter<R, W>) -> Result<BenchConfig> {
        let inserts_in_main = match args.inserts {
            Some(n) => n,
            None => prompter.ask("insert count", "How many keys should be inserted in the main thread?")?,
        };
        let total_ops = match args.ops {
            Some(n) => n,
            None => prompter.ask("op count", "How many ops total should be executed?")?,
        };
        let search = match args.search {
            Some(f) => f,
            None => prompter.ask("search fraction", "Percent of ops that should be searches? (between 0 and 1)")?,
        };
        let insert = match args.insert {
            Some(f) => f,
            None => prompter.ask("insert fraction", "Percent of ops that should be inserts? (between 0 and 1)")?,
        };

        let config = BenchConfig {
            threads: args.thread_count as usize,
            inserts_in_main,
            total_ops,
            mix: OpMix::new(search, insert),
            lock: args.lock,
            seed: args.seed,
            show_list: args.show_list,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(BenchError::NoThreads);
        }
        for (name, value) in [("search fraction", self.mix.search), ("insert fraction", self.mix.insert)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BenchError::FractionOutOfRange { name, value });
            }
        }
        let sum = self.mix.search + self.mix.insert;
        // leave room for float noise like 0.7 + 0.3
        if sum > 1.0 + 1e-9 {
            return Err(BenchError::FractionsExceedOne(sum));
        }
        Ok(())
    }
}

/// Asks questions on `output` and reads whitespace-separated answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Prompter<R, W> {
        Prompter {
            input,
            output,
            pending: VecDeque::new(),
        }
    }

    pub fn ask<T>(&mut self, field: &'static str, question: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let answer = self.next_token(field)?;
        answer.parse().map_err(|e: T::Err| BenchError::Parse {
            field,
            reason: e.to_string(),
            answer,
        })
    }

    fn next_token(&mut self, field: &'static str) -> Result<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(BenchError::InputClosed(field));
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    fn build(argv: &[&str], stdin: &str) -> (Result<BenchConfig>, String) {
        let args = parse(argv);
        let mut out = Vec::new();
        let mut prompter = Prompter::new(Cursor::new(stdin.as_bytes()), &mut out);
        let config = BenchConfig::from_cli(&args, &mut prompter);
        (config, String::from_utf8(out).unwrap())
    }

    #[test]
    fn thread_count_is_required() {
        assert!(CliArgs::try_parse_from(["rwlist"]).is_err());
        assert!(CliArgs::try_parse_from(["rwlist", "4", "5"]).is_err());
        assert!(CliArgs::try_parse_from(["rwlist", "0"]).is_err());
        assert_eq!(parse(&["rwlist", "4"]).thread_count, 4);
    }

    #[test]
    fn prompts_for_everything() {
        let (config, out) = build(&["rwlist", "4"], "100\n10000\n0.5\n0.3\n");
        let config = config.unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.inserts_in_main, 100);
        assert_eq!(config.total_ops, 10000);
        assert_eq!(config.mix, OpMix::new(0.5, 0.3));
        assert_eq!(config.lock, LockChoice::Pthread);
        assert!(out.starts_with("How many keys should be inserted in the main thread?\n"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn answers_may_share_a_line() {
        let (config, _) = build(&["rwlist", "2"], "10 20\n\n  0.9 0.1");
        let config = config.unwrap();
        assert_eq!((config.inserts_in_main, config.total_ops), (10, 20));
        assert_eq!(config.mix, OpMix::new(0.9, 0.1));
    }

    #[test]
    fn flags_skip_prompts() {
        let (config, out) = build(
            &["rwlist", "8", "--lock", "custom", "--main-inserts", "5", "--ops", "50", "--search", "1", "--insert", "0"],
            "",
        );
        let config = config.unwrap();
        assert_eq!(config.lock, LockChoice::Custom);
        assert_eq!(config.total_ops, 50);
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_bad_answers() {
        let (config, _) = build(&["rwlist", "1"], "ten\n");
        assert!(matches!(config, Err(BenchError::Parse { field: "insert count", .. })));

        let (config, _) = build(&["rwlist", "1"], "1\n2\n");
        assert!(matches!(config, Err(BenchError::InputClosed("search fraction"))));

        let (config, _) = build(&["rwlist", "1"], "1 2 1.5 0\n");
        assert!(matches!(config, Err(BenchError::FractionOutOfRange { name: "search fraction", .. })));

        let (config, _) = build(&["rwlist", "1"], "1 2 0.8 0.3\n");
        assert!(matches!(config, Err(BenchError::FractionsExceedOne(_))));
    }

    #[test]
    fn exact_sum_of_one_is_fine() {
        let (config, _) = build(&["rwlist", "1"], "1 2 0.7 0.3\n");
        assert!(config.is_ok());
    }
}
