//! Turns an install mode into the ordered step list.

use std::path::Path;

use super::env;
use super::shell::{ShellCommand, quote, quote_path};
use super::{Block, Guard, Plan, Step};
use crate::context::ProvisionContext;
use crate::manifest::{
    self, GMMLIB, LIBVA, LIBVA_UTILS, MEDIA_DRIVER, MEDIA_SDK, Manifest, Repository, TBB,
};
use crate::mode::InstallMode;

/// Build the full plan for `mode`.
///
/// MSDK-gated blocks are left out entirely under `-nomsdk`; the firmware
/// variant follows the build target; clones and downloads carry existence
/// guards so reruns skip them.
pub fn build_plan(mode: &InstallMode, ctx: &ProvisionContext) -> anyhow::Result<Plan> {
    let mut steps = Vec::new();
    let msdk = mode.enable_msdk();

    if msdk {
        firmware_steps(mode, ctx, &mut steps)?;
    }
    layout_steps(ctx, &mut steps);
    if msdk {
        source_steps(ctx, &mut steps)?;
        libva_steps(ctx, &mut steps)?;
        media_driver_steps(ctx, &mut steps)?;
        tbb_steps(ctx, &mut steps)?;
    }
    toolkit_steps(mode, ctx, &mut steps);
    opencl_steps(ctx, &mut steps)?;
    if msdk {
        media_sdk_steps(ctx, &mut steps)?;
        environment_steps(ctx, &mut steps);
    }

    tracing::debug!(mode = %mode.describe(), steps = steps.len(), "Built provisioning plan");
    Ok(Plan::new(mode.clone(), steps))
}

fn clone_step(block: Block, repo: &Repository, work_dir: &Path) -> anyhow::Result<Step> {
    let dest = repo.checkout_dir(work_dir)?;
    let command = ShellCommand::new().then(format!(
        "git clone {} {}",
        quote(&repo.url),
        quote_path(&dest)
    ));
    Ok(Step::new(block, format!("clone {}", repo.name), command).guarded(Guard::SkipIfExists(dest)))
}

/// Chain starting in the checkout with the pinned revision applied.
fn pinned_checkout(repo: &Repository, work_dir: &Path) -> anyhow::Result<ShellCommand> {
    let command = ShellCommand::in_dir(repo.checkout_dir(work_dir)?);
    Ok(match &repo.revision {
        Some(rev) => command.then(format!("git checkout {}", quote(rev))),
        None => command,
    })
}

fn firmware_steps(
    mode: &InstallMode,
    ctx: &ProvisionContext,
    steps: &mut Vec<Step>,
) -> anyhow::Result<()> {
    let repo = Manifest::linux_firmware();
    let checkout = repo.checkout_dir(ctx.work_dir())?;
    steps.push(clone_step(Block::Firmware, &repo, ctx.work_dir())?);

    let variant = mode.firmware();
    let fw_dir = &ctx.config().firmware_dir;
    let installed = fw_dir.join(variant.blob());
    let link = fw_dir.join(variant.link_name());
    let command = ShellCommand::new()
        .then(format!("mkdir -p {}", quote_path(fw_dir)))
        .then(format!(
            "cp {} {}/",
            quote_path(&variant.source_path(&checkout)),
            quote_path(fw_dir)
        ))
        .then(format!("rm -f {}", quote_path(&link)))
        .then(format!(
            "ln -s {} {}",
            quote_path(&installed),
            quote_path(&link)
        ));
    steps.push(Step::new(
        Block::Firmware,
        format!("install {}", variant.blob()),
        command,
    ));
    Ok(())
}

fn layout_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) {
    let command = ShellCommand::new()
        .then(format!("mkdir -p {}", quote_path(&ctx.build_dir())))
        .then(format!("mkdir -p {}", quote_path(ctx.install_prefix())));
    steps.push(Step::new(Block::Layout, "create install paths", command));
}

fn source_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) -> anyhow::Result<()> {
    for repo in ctx.manifest().repositories() {
        steps.push(clone_step(Block::Sources, repo, ctx.work_dir())?);
    }
    Ok(())
}

fn libva_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) -> anyhow::Result<()> {
    let jobs = ctx.config().make_jobs;
    for name in [LIBVA, LIBVA_UTILS] {
        let repo = ctx.manifest().get(name)?;
        let command = pinned_checkout(repo, ctx.work_dir())?
            .then(format!(
                "./autogen.sh --prefix=/usr --libdir={}",
                env::MULTIARCH_LIB_DIR
            ))
            .then(format!("make -j{}", jobs))
            .then("make install");
        steps.push(Step::new(Block::Libva, format!("build {}", name), command));
    }
    Ok(())
}

fn media_driver_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) -> anyhow::Result<()> {
    for name in [GMMLIB, MEDIA_DRIVER] {
        let repo = ctx.manifest().get(name)?;
        steps.push(Step::new(
            Block::MediaDriver,
            format!("checkout {}", name),
            pinned_checkout(repo, ctx.work_dir())?,
        ));
    }

    let driver_src = ctx.manifest().get(MEDIA_DRIVER)?.checkout_dir(ctx.work_dir())?;
    let command = ShellCommand::in_dir(ctx.build_dir())
        .then(format!("cmake {}", quote_path(&driver_src)))
        .then(format!("make -j{}", ctx.config().make_jobs))
        .then("make install");
    steps.push(Step::new(Block::MediaDriver, "build media-driver", command));
    Ok(())
}

fn tbb_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) -> anyhow::Result<()> {
    let repo = ctx.manifest().get(TBB)?;
    let build = pinned_checkout(repo, ctx.work_dir())?.then("make tbb tbbmalloc");
    steps.push(Step::new(Block::Tbb, "build tbb", build));

    let root = ctx.tbb_root();
    let lib = quote_path(&root.join("lib"));
    let stage = ShellCommand::in_dir(repo.checkout_dir(ctx.work_dir())?)
        .env("TBBROOT", root.to_string_lossy())
        .then(format!(
            "mkdir -p {} {}",
            quote_path(&root.join("bin")),
            lib
        ))
        .then(format!("cp -r include {}", quote_path(&root)))
        .then(format!("cp build/linux_*_release/libtbbmalloc* {}", lib))
        .then(format!("cp build/linux_*_release/libtbb.so* {}", lib));
    steps.push(Step::new(Block::Tbb, "stage tbb", stage));
    Ok(())
}

fn toolkit_steps(mode: &InstallMode, ctx: &ProvisionContext, steps: &mut Vec<Step>) {
    let package = if mode.install_cvsdk() {
        &ctx.config().legacy_toolkit
    } else {
        &ctx.config().toolkit
    };
    let archive = ctx.work_dir().join(package.archive_name());

    match &package.url {
        Some(url) => {
            // Only a complete 2xx transfer is renamed to the guarded archive.
            let name = package.archive_name();
            let partial = format!("{}.part", name);
            let download = ShellCommand::in_dir(ctx.work_dir())
                .then(format!(
                    "curl -f -# -o {} {}",
                    quote(&partial),
                    quote(url)
                ))
                .then(format!("mv {} {}", quote(&partial), quote(&name)));
            steps.push(
                Step::new(
                    Block::Toolkit,
                    format!("download {}", package.archive_stem),
                    download,
                )
                .guarded(Guard::SkipIfExists(archive)),
            );
        }
        None => tracing::warn!(
            archive = %archive.display(),
            "Toolkit has no download URL; the archive must already be in the working directory"
        ),
    }

    let stem = quote(&package.archive_stem);
    let silent = quote(&package.silent_config);
    let install = ShellCommand::in_dir(ctx.work_dir())
        .then(format!("tar -xzf {}", quote(&package.archive_name())))
        .then(format!("cp {} {}/", silent, stem))
        .then(format!("cd {}", stem))
        .then(format!("./install.sh -s {}", silent));
    steps.push(Step::new(
        Block::Toolkit,
        format!("install {}", package.archive_stem),
        install,
    ));
}

fn opencl_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) -> anyhow::Result<()> {
    let neo = ctx.neo_dir();
    let mut command = ShellCommand::new()
        .then(format!("mkdir -p {}", quote_path(&neo)))
        .then(format!("cd {}", quote_path(&neo)));
    for url in manifest::neo_package_urls()? {
        command = command.then(format!("wget -nc {}", quote(&url)));
    }
    let command = command.then("dpkg -i *.deb").then("ldconfig");
    steps.push(Step::new(Block::OpenCl, "install OpenCL runtime", command));
    Ok(())
}

fn media_sdk_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) -> anyhow::Result<()> {
    let prefix = ctx.mediasdk_prefix();
    steps.push(
        Step::new(
            Block::MediaSdk,
            "remove previous Media SDK install",
            ShellCommand::new().then(format!("rm -rf {}", quote_path(&prefix))),
        )
        .guarded(Guard::RunIfExists(prefix)),
    );

    let repo = ctx.manifest().get(MEDIA_SDK)?;
    let src = repo.checkout_dir(ctx.work_dir())?;
    let command = pinned_checkout(repo, ctx.work_dir())?
        .env("MFX_HOME", src.to_string_lossy())
        .then("mkdir -p build")
        .then("cd build")
        .then("cmake ..")
        .then(format!("make -j{}", ctx.config().sdk_make_jobs))
        .then("make install");
    steps.push(Step::new(Block::MediaSdk, "build MediaSDK", command));
    Ok(())
}

fn environment_steps(ctx: &ProvisionContext, steps: &mut Vec<Step>) {
    let profile = ctx.profile();
    let exports = ShellCommand::new().then(env::write_lines(
        &env::profile_exports(ctx),
        profile,
        true,
    ));
    steps.push(
        Step::new(Block::Environment, "export profile variables", exports).guarded(
            Guard::SkipIfFileContains {
                path: profile.to_path_buf(),
                needle: env::PROFILE_MARKER.to_string(),
            },
        ),
    );

    let ld_conf = &ctx.config().ld_conf;
    let loader = ShellCommand::new()
        .then(env::write_lines(&env::ld_conf_entries(), ld_conf, false))
        .then("ldconfig");
    steps.push(Step::new(
        Block::Environment,
        "configure dynamic loader",
        loader,
    ));

    let root = ctx.tbb_root();
    let script = root.join("bin").join("tbbvars.sh");
    let tbbvars = ShellCommand::new()
        .then(format!("mkdir -p {}", quote_path(&root.join("bin"))))
        .then(env::write_lines(&env::tbbvars(&root), &script, false))
        .then(format!("chmod +x {}", quote_path(&script)));
    steps.push(Step::new(Block::Environment, "write tbbvars.sh", tbbvars));
}
