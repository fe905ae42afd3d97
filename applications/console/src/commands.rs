//! Console command parsing
//!
//! One command per line, mirroring the chat commands a group would send:
//! the first word is the command, most commands then name a chat id.

use crate::error::{ConsoleError, Result};
use chorus_core::ChatId;
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  play <chat> <query...>      search and play (or queue) the first hit
  search <query...>           list matching tracks
  pick <chat> <n>             play result n of the last search
  queue <chat>                show the queue
  skip <chat>                 skip the current track
  pause <chat>                pause playback
  resume <chat>               resume playback
  stop <chat>                 stop and leave the call
  clear <chat>                clear the queue (stops playback)
  volume <chat> <1-200>       set call volume
  remove <chat> <pos>         remove a queued track
  move <chat> <from> <to>     reorder queued tracks
  status                      list active chats
  end-call <chat>             simulate the voice call ending
  help                        show this help
  quit                        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play { chat_id: ChatId, query: String },
    Search { query: String },
    Pick { chat_id: ChatId, index: usize },
    Queue { chat_id: ChatId },
    Skip { chat_id: ChatId },
    Pause { chat_id: ChatId },
    Resume { chat_id: ChatId },
    Stop { chat_id: ChatId },
    Clear { chat_id: ChatId },
    Volume { chat_id: ChatId, level: u32 },
    Remove { chat_id: ChatId, position: usize },
    Move { chat_id: ChatId, from: usize, to: usize },
    Status,
    EndCall { chat_id: ChatId },
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; blank lines and `#` comments yield `None`
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for Command {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ConsoleError::UnknownCommand(String::new()));
        };
        let mut args = Args { words };

        let command = match name.to_lowercase().as_str() {
            "play" | "p" => {
                let usage = "play <chat> <query...>";
                let chat_id = args.chat(usage)?;
                let query = args.rest(usage)?;
                Command::Play { chat_id, query }
            }
            "search" => Command::Search {
                query: args.rest("search <query...>")?,
            },
            "pick" => {
                let usage = "pick <chat> <n>";
                Command::Pick {
                    chat_id: args.chat(usage)?,
                    index: args.number(usage)?,
                }
            }
            "queue" | "q" => Command::Queue {
                chat_id: args.chat("queue <chat>")?,
            },
            "skip" => Command::Skip {
                chat_id: args.chat("skip <chat>")?,
            },
            "pause" => Command::Pause {
                chat_id: args.chat("pause <chat>")?,
            },
            "resume" => Command::Resume {
                chat_id: args.chat("resume <chat>")?,
            },
            "stop" => Command::Stop {
                chat_id: args.chat("stop <chat>")?,
            },
            "clear" => Command::Clear {
                chat_id: args.chat("clear <chat>")?,
            },
            "volume" | "vol" => {
                let usage = "volume <chat> <1-200>";
                Command::Volume {
                    chat_id: args.chat(usage)?,
                    level: args.number(usage)?,
                }
            }
            "remove" => {
                let usage = "remove <chat> <pos>";
                Command::Remove {
                    chat_id: args.chat(usage)?,
                    position: args.number(usage)?,
                }
            }
            "move" => {
                let usage = "move <chat> <from> <to>";
                Command::Move {
                    chat_id: args.chat(usage)?,
                    from: args.number(usage)?,
                    to: args.number(usage)?,
                }
            }
            "status" => Command::Status,
            "end-call" => Command::EndCall {
                chat_id: args.chat("end-call <chat>")?,
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

struct Args<'a> {
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn word(&mut self, usage: &'static str) -> Result<&'a str> {
        self.words.next().ok_or(ConsoleError::Usage(usage))
    }

    fn number<T: FromStr>(&mut self, usage: &'static str) -> Result<T> {
        let word = self.word(usage)?;
        word.parse()
            .map_err(|_| ConsoleError::InvalidNumber(word.to_string()))
    }

    fn chat(&mut self, usage: &'static str) -> Result<ChatId> {
        self.number::<i64>(usage).map(ChatId::new)
    }

    fn rest(&mut self, usage: &'static str) -> Result<String> {
        let rest: Vec<&str> = self.words.by_ref().collect();
        if rest.is_empty() {
            return Err(ConsoleError::Usage(usage));
        }
        Ok(rest.join(" "))
    }
}
