//! Builds WSL distributions out of Docker images.
//!
//! Each distro lives in `<workspace>/WSLBuilder/<name>/` with the exported
//! `<name>.tar` image and, once imported into WSL, its `ext4.vhdx` disk.
//! Docker runs inside the WSL instance created by `--init`.

use crate::args::unquote;
use crate::console::color;
use crate::error::{ToolError, ToolInitError};
use crate::ops;
use crate::session::Session;
use crate::tool::{require, ArgSpec, Descriptor, Handler, Invocation, ToolImpl};
use crate::workspace::{format_size, list_dirs, sanitize_name, Workspace};
use anyhow::{anyhow, bail, Context, Result};
use fs_err as fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const DISK_FILE: &str = "ext4.vhdx";
const BUILDER_DISTRO: &str = "wslbuilder";
const WSL_HINT: &str = "WSLBuilder needs the Windows Subsystem for Linux";

pub struct WslBuilder {
    descriptor: Descriptor<WslBuilder>,
    dir: PathBuf,
    libs: PathBuf,
}

fn wsl<I, S>(args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = Command::new("wsl");
    cmd.args(args);
    cmd
}

impl WslBuilder {
    pub const NAME: &'static str = "WSLBuilder";

    pub fn new(workspace: &Workspace) -> Result<Self, ToolInitError> {
        let descriptor = Descriptor::new(
            Self::NAME,
            "1.1",
            Invocation::new("wslbuilder", "wb", "(wb)wslbuilder"),
            vec![
                ArgSpec::new("-c", "--create", "<distro>", "Create a wsl distribution"),
                ArgSpec::detailed(
                    "-d",
                    "--delete",
                    "<distro>",
                    "Remove a wsl distribution image and disk",
                    &["add -f to skip the confirmation"],
                ),
                ArgSpec::new("-D", "--full-delete", "<distro>", "Remove a wsl distribution image and disk with docker traces"),
                ArgSpec::new("-e", "--export", "<distro>", "Export a wsl distribution into a tar image"),
                ArgSpec::new("-i", "--install", "<distro>", "Install a wsl distribution to workspace"),
                ArgSpec::new("-I", "--init", "", "Init a wsl builder instance with docker"),
                ArgSpec::new("-l", "--list", "", "List all wsl distributions"),
                ArgSpec::new("-S", "--stat", "<distro>", "Show statistics about a wsl distributions"),
                ArgSpec::new("-s", "--start", "<distro>", "Launch a wsl instance"),
            ],
            vec![
                WslBuilder::create as Handler<WslBuilder>,
                WslBuilder::delete as Handler<WslBuilder>,
                WslBuilder::full_delete as Handler<WslBuilder>,
                WslBuilder::export as Handler<WslBuilder>,
                WslBuilder::install as Handler<WslBuilder>,
                WslBuilder::init as Handler<WslBuilder>,
                WslBuilder::list as Handler<WslBuilder>,
                WslBuilder::stat as Handler<WslBuilder>,
                WslBuilder::start as Handler<WslBuilder>,
            ],
        )?;
        Ok(Self {
            descriptor,
            dir: workspace.tool_dir(Self::NAME),
            libs: workspace.root().join("libs").join(BUILDER_DISTRO),
        })
    }

    fn distro_dir(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn image_path(&self, name: &str) -> PathBuf {
        self.distro_dir(name).join(format!("{name}.tar"))
    }

    fn is_active(&self, name: &str) -> bool {
        self.distro_dir(name).join(DISK_FILE).is_file()
    }

    /// Sanitized name of an existing distro.
    fn existing(&self, raw: &str) -> Result<String, ToolError> {
        let name = sanitize_name(unquote(raw));
        if self.distro_dir(&name).is_dir() {
            Ok(name)
        } else {
            Err(ToolError::NotFound {
                what: "wsl distribution",
                name,
                location: self.dir.clone(),
            })
        }
    }

    fn ensure_active(&self, session: &mut Session<'_>, name: &str) -> bool {
        if self.is_active(name) {
            return true;
        }
        session.console.warn("Wsl distribution is inactive");
        false
    }

    fn docker_running() -> Result<bool> {
        let mut cmd = wsl(["service", "docker", "status"]);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        Ok(ops::run_status(&mut cmd)? == 0)
    }

    fn offer_start(&self, session: &mut Session<'_>, name: &str) -> Result<()> {
        if session.console.confirm("Did you want to start it ?") {
            ops::run_status(&mut wsl(["-d", name]))?;
        }
        Ok(())
    }

    fn create(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-c <distro>")?;
        let image = unquote(&args[0]);
        let name = sanitize_name(image);
        let path = self.distro_dir(&name);
        if path.exists() {
            session.console.warn("Wsl distribution already exist on workspace");
            return Ok(());
        }
        ops::require_program("wsl", WSL_HINT)?;
        fs::create_dir_all(&path)?;

        if let Err(e) = self.build_distro(image, &name, &path) {
            fs::remove_dir_all(&path).ok();
            return Err(e);
        }
        session.console.info(format!("{name} created at {}", path.display()));
        self.offer_start(session, &name)
    }

    fn build_distro(&self, image: &str, name: &str, path: &Path) -> Result<()> {
        if !Self::docker_running()? {
            bail!("Docker wasn't started on wsl");
        }
        if ops::run_status(&mut wsl(["docker", "pull", image]))? != 0 {
            bail!("Docker hasn't found {image} image");
        }
        ops::run_checked(&mut wsl(["docker", "run", "-d", "--name", name, image]))?;

        let tar = self.image_path(name);
        let out = std::fs::File::create(&tar).with_context(|| format!("creating {}", tar.display()))?;
        let mut export = wsl(["docker", "export", name]);
        export.stdout(Stdio::from(out));
        ops::run_checked(&mut export).context("exporting the container filesystem")?;

        let mut import = wsl(["--import", name]);
        import.arg(path).arg(&tar);
        ops::run_checked(&mut import)
    }

    fn delete(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-d <distro>")?;
        let name = self.existing(&args[0])?;
        let forced = args[1..].iter().any(|a| a == "-f");
        if !forced && !session.console.confirm(&format!("Confirm the deletion of {} ?", unquote(&args[0]))) {
            return Ok(());
        }
        ops::require_program("wsl", WSL_HINT)?;
        if self.is_active(&name) && ops::run_status(&mut wsl(["--unregister", name.as_str()]))? != 0 {
            session.console.warn(format!("wsl couldn't unregister {name}"));
        }
        fs::remove_dir_all(self.distro_dir(&name))?;
        session.console.info(format!("{name} removed"));
        Ok(())
    }

    fn full_delete(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-D <distro>")?;
        let image = unquote(&args[0]);
        let name = sanitize_name(image);
        if !session.console.confirm(&format!("Confirm the deletion of {image} ?")) {
            return Ok(());
        }
        ops::require_program("wsl", WSL_HINT)?;
        ops::run_status(&mut wsl(["docker", "rm", name.as_str()]))?;
        ops::run_status(&mut wsl(["docker", "rmi", image]))?;
        if self.distro_dir(&name).is_dir() {
            self.delete(session, &[args[0].clone(), "-f".to_string()])?;
        }
        Ok(())
    }

    fn export(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-e <distro>")?;
        let name = self.existing(&args[0])?;
        if !self.ensure_active(session, &name) {
            return Ok(());
        }
        ops::require_program("wsl", WSL_HINT)?;
        let tar = self.image_path(&name);
        let mut cmd = wsl(["--export", name.as_str()]);
        cmd.arg(&tar);
        ops::run_checked(&mut cmd)?;
        session.console.info(format!("{name} exported to {}", tar.display()));
        Ok(())
    }

    fn install(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-i <distro>")?;
        let name = sanitize_name(unquote(&args[0]));
        let path = self.distro_dir(&name);
        if !path.is_dir() {
            session.console.error(format!("{name} isn't found in {}", self.dir.display()));
            session.console.tips(format!(
                "Make sure you have {name} in {} with {name}.tar inside",
                self.dir.display()
            ));
            return Err(anyhow!("nothing to install for {name}"));
        }
        ops::require_program("wsl", WSL_HINT)?;
        if !self.is_active(&name) {
            let mut cmd = wsl(["--import", name.as_str()]);
            cmd.arg(&path).arg(self.image_path(&name));
            ops::run_checked(&mut cmd)?;
        }
        self.offer_start(session, &name)
    }

    fn init(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        let tar = self.libs.join(format!("{BUILDER_DISTRO}.tar"));
        if !tar.is_file() {
            session
                .console
                .error(format!("WSLBuilder libs doesn't exist at {}", self.libs.display()));
            session
                .console
                .tips(format!("Place {BUILDER_DISTRO}.tar in {} first", self.libs.display()));
            return Err(anyhow!("missing {}", tar.display()));
        }
        ops::require_program("wsl", WSL_HINT)?;

        let mut import = wsl(["--import", BUILDER_DISTRO]);
        import.arg(&self.libs).arg(&tar);
        ops::run_checked(&mut import)?;
        ops::run_checked(&mut wsl(["-s", BUILDER_DISTRO]))?;
        ops::run_checked(&mut wsl(["apk", "update"]))?;
        ops::run_checked(&mut wsl(["apk", "add", "docker", "openrc"]))?;

        if !Self::docker_running()? && ops::run_status(&mut wsl(["service", "docker", "start"]))? != 0 {
            // openrc refuses to start services until its softlevel file exists
            ops::run_checked(&mut wsl(["touch", "/run/openrc/softlevel"]))?;
            ops::run_checked(&mut wsl(["service", "docker", "start"]))?;
        }
        session.console.info("WSLBuilder instance is ready");
        Ok(())
    }

    fn list(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        let distros = list_dirs(&self.dir)?;
        if distros.is_empty() {
            session.console.info(format!("No distribution in {}", self.dir.display()));
            return Ok(());
        }
        session
            .console
            .line(format!("   *  {:<18}{:<12}Path", "Name", "Size"));
        for (i, distro) in distros.iter().enumerate() {
            let disk = self.distro_dir(distro).join(DISK_FILE);
            let (size, code) = match fs::metadata(&disk) {
                Ok(meta) => (format_size(meta.len()), color::PURPLE),
                Err(_) => ("INACTIVE".to_string(), color::RED),
            };
            let c = &session.console;
            let row = format!(
                "  {}. {}{}{}",
                c.paint(color::GREEN, &format!("{:>2}", i + 1)),
                c.paint(color::CYAN, &format!("{:<18}", distro.replace('-', ":"))),
                c.paint(code, &format!("{size:<12}")),
                c.paint(color::YELLOW, &self.distro_dir(distro).display().to_string()),
            );
            session.console.line(row);
        }
        Ok(())
    }

    fn stat(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-S <distro>")?;
        let name = self.existing(&args[0])?;
        let path = self.distro_dir(&name);
        let image = self.image_path(&name);
        let image_size = fs::metadata(&image)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "missing".to_string());

        let c = &session.console;
        let mut rows = vec![
            format!("* {:<8}: {}", "Name", c.paint(color::CYAN, unquote(&args[0]))),
            format!("* {:<8}: {}", "Path", c.paint(color::YELLOW, &path.display().to_string())),
            format!("* {:<8}: [ {} ] {name}.tar", "Image", c.paint(color::PURPLE, &image_size)),
        ];
        match fs::metadata(path.join(DISK_FILE)) {
            Ok(meta) => rows.push(format!(
                "* {:<8}: [ {} ] {DISK_FILE}",
                "Disk",
                c.paint(color::PURPLE, &format_size(meta.len()))
            )),
            Err(_) => rows[0].push_str(&format!(" [ {} ]", c.paint(color::RED, "INACTIVE"))),
        }
        session.console.blank();
        for row in rows {
            session.console.line(format!("  {row}"));
        }
        Ok(())
    }

    fn start(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-s <distro>")?;
        let name = self.existing(&args[0])?;
        if !self.ensure_active(session, &name) {
            return Ok(());
        }
        ops::require_program("wsl", WSL_HINT)?;
        ops::run_status(&mut wsl(["-d", name.as_str()]))?;
        Ok(())
    }
}

impl ToolImpl for WslBuilder {
    fn descriptor(&self) -> &Descriptor<Self> {
        &self.descriptor
    }

    fn workspace(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}
