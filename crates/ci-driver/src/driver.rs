use std::{collections::VecDeque, fmt, mem};

use camino::Utf8PathBuf;
use ci_resolve::ResolutionContext;
use ci_tree::program::Program;
use ci_utils::io::FileSystem;
use log::{debug, info};

use crate::{error::DriverError, parser::FileParser};

#[derive(Debug)]
pub enum DriverState {
    /// Files still to parse, in order.
    Pending(VecDeque<Utf8PathBuf>),
    /// The file currently being parsed.
    Running(Utf8PathBuf),
    Succeeded,
    Failed(DriverError),
}

impl DriverState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(paths) => write!(f, "pending ({} files)", paths.len()),
            Self::Running(path) => write!(f, "running {path}"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(err) => write!(f, "failed at {}", err.path()),
        }
    }
}

/// Everything a finished run produced.
///
/// On failure `context` and `program` hold exactly the files before the
/// failing one.
#[derive(Debug)]
pub struct Outcome {
    pub context: ResolutionContext,
    pub program: Program,
    pub result: Result<(), DriverError>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Parses a list of files in order, stopping at the first one that fails.
///
/// Files after a failure are never read.
pub struct Driver {
    io: Box<dyn FileSystem>,
    context: ResolutionContext,
    program: Program,
    state: DriverState,
}

impl Driver {
    pub fn new<P>(io: impl FileSystem + 'static, paths: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<Utf8PathBuf>,
    {
        let paths = paths.into_iter().map(Into::into).collect::<VecDeque<_>>();
        debug!("driver created with {} files", paths.len());

        Self {
            io: Box::new(io),
            context: ResolutionContext::new(),
            program: Program::new(),
            state: DriverState::Pending(paths),
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Handles the next file, or settles into a terminal state.
    ///
    /// Stepping a terminal state does nothing.
    pub fn step(&mut self) -> &DriverState {
        if let DriverState::Pending(paths) = &mut self.state {
            let mut rest = mem::take(paths);

            self.state = match rest.pop_front() {
                None => DriverState::Succeeded,
                Some(path) => self.process(path, rest),
            };

            debug!("driver {}", self.state);
        }

        &self.state
    }

    fn process(&mut self, path: Utf8PathBuf, rest: VecDeque<Utf8PathBuf>) -> DriverState {
        let bytes = match self.io.read_bytes(&path) {
            Ok(bytes) => bytes,
            Err(source) => return DriverState::Failed(DriverError::Io { path, source }),
        };

        self.state = DriverState::Running(path.clone());

        let mut parser = FileParser::new(&mut self.context, &mut self.program);
        match parser.parse(&path, &bytes) {
            Ok(_) => DriverState::Pending(rest),
            Err(err) => {
                debug!("{} files left unread", rest.len());
                DriverState::Failed(err.into())
            }
        }
    }

    /// Steps until the run succeeds or fails.
    pub fn run(mut self) -> Outcome {
        while !self.state.is_terminal() {
            self.step();
        }

        let result = match self.state {
            DriverState::Failed(err) => Err(err),
            _ => Ok(()),
        };

        match &result {
            Ok(()) => info!(
                "parsed {} files, {} declarations",
                self.program.units().len(),
                self.program.len()
            ),
            Err(err) => info!("stopped at {}", err.path()),
        }

        Outcome {
            context: self.context,
            program: self.program,
            result,
        }
    }
}
