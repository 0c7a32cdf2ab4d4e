//! Append-only Dockerfile instruction sequence and its text rendering.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Account Docker runs instructions as until the first `USER`.
pub const ROOT_USER: &str = "root";

/// One Dockerfile instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `RUN <shell>`
    Run(String),
    /// `WORKDIR <path>`
    Workdir(String),
    /// `ENV k=v ...`, in insertion order
    Env(Vec<(String, String)>),
    /// `USER <name>` that stays in effect
    User(String),
    /// `USER <name>` that is expected to be switched back later
    UserSwitch(String),
    /// `COPY [--from=<from>] <src> <dst>`
    Copy {
        src: String,
        dst: String,
        from: Option<String>,
    },
    /// `CMD`
    Cmd(String),
}

/// An ordered Dockerfile under construction.
///
/// Builder methods never validate their arguments: shell commands and paths
/// are passed through as given. [`render`](Self::render) is a pure function
/// of the stored sequence.
///
/// # Examples
///
/// ```
/// use opencl_docker_build::InstructionDocument;
///
/// let mut doc = InstructionDocument::new("ubuntu:24.04");
/// doc.workdir("/src");
/// doc.run("make -j");
/// doc.cmd("/bin/bash");
///
/// assert_eq!(
///     doc.render(),
///     "FROM ubuntu:24.04\nWORKDIR /src\nRUN make -j\nCMD [\"/bin/bash\"]\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDocument {
    base_image: String,
    instructions: Vec<Instruction>,
}

impl InstructionDocument {
    pub fn new(base_image: impl Into<String>) -> Self {
        Self {
            base_image: base_image.into(),
            instructions: Vec::new(),
        }
    }

    pub fn base_image(&self) -> &str {
        &self.base_image
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn run(&mut self, shell: impl Into<String>) {
        self.push(Instruction::Run(shell.into()));
    }

    pub fn workdir(&mut self, path: impl Into<String>) {
        self.push(Instruction::Workdir(path.into()));
    }

    /// Appends one `ENV` line. Keys repeated across calls are kept as-is;
    /// the later one wins at build time. An empty mapping appends nothing,
    /// since Docker rejects a bare `ENV`.
    pub fn env<K, V>(&mut self, vars: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if vars.is_empty() {
            return;
        }
        self.push(Instruction::Env(vars));
    }

    pub fn user(&mut self, name: impl Into<String>) {
        self.push(Instruction::User(name.into()));
    }

    /// Like [`user`](Self::user), but marks a switch the caller intends to
    /// undo. Prefer [`escalate`](Self::escalate), which undoes it for you.
    pub fn userswitch(&mut self, name: impl Into<String>) {
        self.push(Instruction::UserSwitch(name.into()));
    }

    pub fn copy(&mut self, src: impl Into<String>, dst: impl Into<String>, from: Option<&str>) {
        self.push(Instruction::Copy {
            src: src.into(),
            dst: dst.into(),
            from: from.map(str::to_owned),
        });
    }

    /// Appends a `CMD`. Nothing stops later appends; when several `CMD`
    /// lines are rendered, Docker uses the last one.
    pub fn cmd(&mut self, command: impl Into<String>) {
        self.push(Instruction::Cmd(command.into()));
    }

    /// User in effect after the last `USER` line, `None` if there is none.
    pub fn effective_user(&self) -> Option<&str> {
        self.instructions.iter().rev().find_map(|i| match i {
            Instruction::User(name) | Instruction::UserSwitch(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Switches to `user` until the returned scope is dropped, then switches
    /// back to whoever was in effect before.
    ///
    /// The scope holds the only mutable borrow of the document, so every
    /// instruction appended in between goes through it.
    ///
    /// ```
    /// use opencl_docker_build::InstructionDocument;
    ///
    /// let mut doc = InstructionDocument::new("ubuntu:24.04");
    /// doc.user("ubuntu");
    /// {
    ///     let mut root = doc.escalate("root");
    ///     root.run("usermod -aG video ubuntu");
    /// }
    /// assert_eq!(doc.effective_user(), Some("ubuntu"));
    /// assert!(doc.render().ends_with("USER root\nRUN usermod -aG video ubuntu\nUSER ubuntu\n"));
    /// ```
    pub fn escalate(&mut self, user: impl Into<String>) -> UserScope<'_> {
        let restore = self.effective_user().unwrap_or(ROOT_USER).to_owned();
        self.userswitch(user);
        UserScope { doc: self, restore }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}

impl fmt::Display for InstructionDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FROM {}", self.base_image)?;
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(shell) => write!(f, "RUN {}", continue_lines(shell)),
            Self::Workdir(path) => write!(f, "WORKDIR {path}"),
            Self::Env(vars) => {
                f.write_str("ENV")?;
                for (key, value) in vars {
                    write!(f, " {key}={}", quote_env_value(value))?;
                }
                Ok(())
            }
            Self::User(name) | Self::UserSwitch(name) => write!(f, "USER {name}"),
            Self::Copy { src, dst, from } => match from {
                Some(image) => write!(f, "COPY --from={image} {src} {dst}"),
                None => write!(f, "COPY {src} {dst}"),
            },
            Self::Cmd(command) => {
                if command.is_empty() {
                    f.write_str("CMD []")
                } else if command.chars().any(char::is_whitespace) {
                    write!(f, "CMD {command}")
                } else {
                    let argv = serde_json::Value::from(vec![command.as_str()]);
                    write!(f, "CMD {argv}")
                }
            }
        }
    }
}

/// Guard returned by [`InstructionDocument::escalate`].
#[derive(Debug)]
pub struct UserScope<'a> {
    doc: &'a mut InstructionDocument,
    restore: String,
}

impl Deref for UserScope<'_> {
    type Target = InstructionDocument;

    fn deref(&self) -> &Self::Target {
        &*self.doc
    }
}

impl DerefMut for UserScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.doc
    }
}

impl Drop for UserScope<'_> {
    fn drop(&mut self) {
        let restore = std::mem::take(&mut self.restore);
        self.doc.userswitch(restore);
    }
}

/// Keeps a multi-line shell string a single `RUN` instruction: every line
/// break gets a trailing `\` unless the caller already wrote one.
fn continue_lines(shell: &str) -> String {
    let shell = shell.trim_end_matches(['\n', '\r']);
    let mut out = String::with_capacity(shell.len());
    let mut lines = shell.split('\n').peekable();
    while let Some(line) = lines.next() {
        out.push_str(line);
        if lines.peek().is_some() {
            if !line.trim_end_matches('\r').ends_with('\\') {
                out.push_str(" \\");
            }
            out.push('\n');
        }
    }
    out
}

fn quote_env_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if !needs_quotes {
        return value.to_owned();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
