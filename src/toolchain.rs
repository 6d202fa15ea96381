use std::path::{Path, PathBuf};
use std::process::Command;

use snafu::{ensure, ResultExt};
use tracing::info;

use crate::error::{CompileResult, SpawnSnafu, ToolFailedSnafu};

/// Turns emitted assembly into an executable.
pub trait Toolchain {
    /// Assembles `asm` and returns the path of the object file.
    fn assemble(&self, asm: &Path) -> CompileResult<PathBuf>;
    fn link(&self, object: &Path, output: &Path) -> CompileResult<()>;
}

/// `nasm -felf64` followed by `ld`.
#[derive(Debug, Clone)]
pub struct Nasm {
    pub assembler: String,
    pub linker: String,
}

impl Default for Nasm {
    fn default() -> Self {
        Self {
            assembler: "nasm".to_string(),
            linker: "ld".to_string(),
        }
    }
}

fn run(tool: &str, cmd: &mut Command) -> CompileResult<()> {
    info!(?cmd, "running {tool}");
    let status = cmd.status().context(SpawnSnafu { tool })?;
    ensure!(status.success(), ToolFailedSnafu { tool, status });
    Ok(())
}

impl Toolchain for Nasm {
    fn assemble(&self, asm: &Path) -> CompileResult<PathBuf> {
        let object = asm.with_extension("o");
        run(
            &self.assembler,
            Command::new(&self.assembler)
                .arg("-felf64")
                .arg(asm)
                .arg("-o")
                .arg(&object),
        )?;
        Ok(object)
    }

    fn link(&self, object: &Path, output: &Path) -> CompileResult<()> {
        run(
            &self.linker,
            Command::new(&self.linker).arg(object).arg("-o").arg(output),
        )
    }
}

/// Assembles and links `asm` into `output`.
pub fn build(toolchain: &impl Toolchain, asm: &Path, output: &Path) -> CompileResult<()> {
    let object = toolchain.assemble(asm)?;
    toolchain.link(&object, output)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::CompileError;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail_link: bool,
    }

    impl Toolchain for Recorder {
        fn assemble(&self, asm: &Path) -> CompileResult<PathBuf> {
            self.calls.borrow_mut().push(format!("as {}", asm.display()));
            Ok(asm.with_extension("o"))
        }

        fn link(&self, object: &Path, output: &Path) -> CompileResult<()> {
            self.calls
                .borrow_mut()
                .push(format!("ld {} {}", object.display(), output.display()));
            if self.fail_link {
                return run("false", &mut Command::new("false"));
            }
            Ok(())
        }
    }

    #[test]
    fn build_assembles_then_links() {
        let tc = Recorder::default();
        build(&tc, Path::new("out.asm"), Path::new("out")).unwrap();
        assert_eq!(*tc.calls.borrow(), vec!["as out.asm", "ld out.o out"]);
    }

    #[test]
    fn missing_tool_is_a_spawn_error() {
        let tc = Nasm {
            assembler: "definitely-not-an-assembler-bfcplus".to_string(),
            ..Nasm::default()
        };
        let err = build(&tc, Path::new("out.asm"), Path::new("out")).unwrap_err();
        assert!(matches!(err, CompileError::Spawn { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_propagates() {
        let tc = Recorder {
            fail_link: true,
            ..Recorder::default()
        };
        let err = build(&tc, Path::new("out.asm"), Path::new("out")).unwrap_err();
        assert!(matches!(err, CompileError::ToolFailed { .. }), "{err:?}");
    }
}
