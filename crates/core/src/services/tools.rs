//! External tool invocation: platform disassemblers and the line differ.

use std::env;
use std::fs;
use std::io::{self, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use log::warn;

use crate::sanitize::Dialect;
use crate::services::disasm::DisasmError;

const OTOOL_PATH: &str = "/usr/bin/otool";
const OBJDUMP_PATH: &str = "/usr/bin/objdump";
const OTOOL_HINT: &str = "To install otool, install Xcode (and its command line tools)";
const OBJDUMP_HINT: &str = "To install objdump, install GNU binutils";

/// Staging files for the external differ. Each symbol's diff overwrites
/// them; two concurrent invocations sharing a temp directory would
/// interfere and are unsupported.
const DIFF_TEMP_A: &str = "exediff_temp_a.txt";
const DIFF_TEMP_B: &str = "exediff_temp_b.txt";

/// A running disassembler child whose stdout is consumed as a line stream.
pub struct ToolStream {
    child: Child,
    reader: BufReader<ChildStdout>,
}

impl ToolStream {
    fn spawn(
        program: &str,
        args: &[&str],
        target: &Path,
        hint: &'static str,
    ) -> Result<Self, DisasmError> {
        if !Path::new(program).is_file() {
            return Err(DisasmError::MissingTool { tool: program.to_string(), hint });
        }

        let mut child = Command::new(program)
            .args(args)
            .arg(target)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DisasmError::Spawn { tool: program.to_string(), source })?;

        let Some(stdout) = child.stdout.take() else {
            return Err(DisasmError::Spawn {
                tool: program.to_string(),
                source: io::Error::other("child stdout was not captured"),
            });
        };

        Ok(Self { child, reader: BufReader::new(stdout) })
    }

    pub fn reader(&mut self) -> &mut BufReader<ChildStdout> {
        &mut self.reader
    }

    /// Reap the child. Its exit status is not interpreted; the output has
    /// already been consumed by the caller.
    pub fn finish(mut self) -> Result<(), DisasmError> {
        self.child.wait()?;
        Ok(())
    }
}

/// Spawn the code disassembler for `path` in the given dialect.
pub fn disassemble_code(dialect: Dialect, path: &Path) -> Result<ToolStream, DisasmError> {
    match dialect {
        Dialect::Otool => ToolStream::spawn(OTOOL_PATH, &["-tV"], path, OTOOL_HINT),
        Dialect::Objdump => {
            ToolStream::spawn(OBJDUMP_PATH, &["-d", "--no-show-raw-insn"], path, OBJDUMP_HINT)
        }
    }
}

/// Spawn the section dumper for the RO-data pass (objdump dialect only).
pub fn dump_rodata(path: &Path) -> Result<ToolStream, DisasmError> {
    ToolStream::spawn(OBJDUMP_PATH, &["-s", "-j", ".rodata"], path, OBJDUMP_HINT)
}

/// Run the external `diff` tool over two text blobs and capture its output.
///
/// `diff` exits nonzero whenever its inputs differ, so the status is
/// ignored. Failure to stage the inputs or to launch the tool yields an
/// explanatory placeholder in place of the diff; processing continues.
pub fn diff_text(text_a: &str, text_b: &str) -> String {
    let tmp = env::temp_dir();
    let path_a = tmp.join(DIFF_TEMP_A);
    let path_b = tmp.join(DIFF_TEMP_B);

    if fs::write(&path_a, text_a).is_err() || fs::write(&path_b, text_b).is_err() {
        return "Error, couldn't find temp folder!".to_string();
    }

    match Command::new("diff").arg(&path_a).arg(&path_b).output() {
        Ok(output) => String::from_utf8_lossy(&output.stdout).into_owned(),
        Err(err) => {
            warn!("failed to launch diff: {err}");
            "Unable to launch diff!".to_string()
        }
    }
}
