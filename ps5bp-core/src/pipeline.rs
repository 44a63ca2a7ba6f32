use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ps5bp_common::{compute_nid, Error};
use ps5bp_elf::decode_import_name;
use ps5bp_fwdb::{ExportsDb, FakelibAvailability, StaticKnowledgeBase};
use ps5bp_self::{fake_sign, is_self_file, ExternalDecrypter, FakeSignOptions};
use ps5bp_stub::Stubber;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::discover::discover_candidates;
use crate::error::{OrchestratorError, Result};
use crate::fakelib_source::{find_fakelib_folder, list_fakelib_files};
use crate::oob_scan::patch_oob_metadata;
use crate::report::{FileResult, PipelineReport, StepOutcome};

/// Runs the full pipeline against `config`, returning the aggregated
/// report. Mutated files are written under `config.output_dir`; an
/// optional ZIP archive and JSON report are written alongside it.
#[instrument(skip(config), fields(input = %config.input_dir.display()))]
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let started = Instant::now();
    let mut report = PipelineReport::new();

    fs::create_dir_all(&config.output_dir).map_err(|e| Error::io(&config.output_dir, e))?;

    let working_dir = if config.input_dir == config.output_dir {
        config.input_dir.clone()
    } else {
        copy_tree(&config.input_dir, &config.output_dir)?;
        config.output_dir.clone()
    };

    let kb = StaticKnowledgeBase::new();
    let exports_db = ExportsDb::new(&config.exports_dir);
    let exports = exports_db
        .for_version(&config.target_fw_label())
        .map_err(OrchestratorError::Component)?;
    let fakelibs = match &config.fakelib_manifest_path {
        Some(path) => FakelibAvailability::load(path).map_err(OrchestratorError::Component)?,
        None => FakelibAvailability::default(),
    };
    let patch_db = match &config.patch_db_path {
        Some(path) => Some(ps5bp_bps::PatchDatabase::load(path).map_err(OrchestratorError::Component)?),
        None => None,
    };
    let decrypter = config.external_decrypter_path.as_ref().map(ExternalDecrypter::new);

    let mut mutated_files: Vec<PathBuf> = Vec::new();

    for file in discover_candidates(&working_dir) {
        let result = process_file(config, &file, &kb, &exports, &fakelibs, patch_db.as_ref(), decrypter.as_ref(), &mut report);
        if matches!(&result, Ok(true)) {
            mutated_files.push(file.clone());
        }
        if let Err(e) = result {
            warn!(file = %file.display(), error = %e, "file pipeline aborted");
            report.files.push(FileResult {
                path: file,
                classification: None,
                steps: Vec::new(),
                error: Some(e.to_string()),
            });
        }
    }

    let fakelib_result = install_fakelibs(&config.target_fw.major.to_string(), &working_dir, &mut report);
    if let Some(source) = &fakelib_result {
        report.fakelib_source = Some(source.clone());
    }

    if config.patch_param {
        report.record_step("patch_param");
        let patched = patch_oob_metadata(&working_dir, config.target_fw).map_err(OrchestratorError::Component)?;
        mutated_files.extend(patched);
    } else {
        info!("param-metadata patch disabled by configuration");
    }

    let archive_path = package_outputs(config, &working_dir, &mutated_files, &report)?;
    report.archive_path = archive_path;

    report.finalize_scores();
    report.elapsed_ms = started.elapsed().as_millis();

    if let Some(report_path) = &config.output_report_path {
        let json = serde_json::to_vec_pretty(&report)?;
        fs::write(report_path, json).map_err(|e| Error::io(report_path, e))?;
    }

    Ok(report)
}

/// Runs unwrap -> parse -> analyze -> BPS -> stub -> SDK-patch -> rewrap
/// for one file, writing the result back in place. Returns whether the
/// file's bytes were actually mutated.
#[instrument(skip(config, path, kb, exports, fakelibs, patch_db, decrypter, report), fields(file = %path.display()))]
#[allow(clippy::too_many_arguments)]
fn process_file(
    config: &PipelineConfig,
    path: &Path,
    kb: &StaticKnowledgeBase,
    exports: &ps5bp_fwdb::FirmwareExports,
    fakelibs: &FakelibAvailability,
    patch_db: Option<&ps5bp_bps::PatchDatabase>,
    decrypter: Option<&ExternalDecrypter>,
    report: &mut PipelineReport,
) -> Result<bool> {
    let mut steps = Vec::new();
    let original = fs::read(path).map_err(|e| Error::io(path, e))?;
    let mut mutated = false;
    let needs_decrypt = is_self_file(&original);

    let mut plain = if needs_decrypt {
        match decrypter {
            Some(tool) => {
                let tmp = tempfile::NamedTempFile::new().map_err(|e| Error::io(path, e))?;
                tool.decrypt(path, tmp.path()).map_err(OrchestratorError::Component)?;
                steps.push(StepOutcome::ran("decrypt"));
                fs::read(tmp.path()).map_err(|e| Error::io(tmp.path(), e))?
            }
            None => {
                steps.push(StepOutcome::skipped("decrypt", "no external decrypter configured"));
                report.record_step("decrypt");
                report.files.push(FileResult { path: path.to_path_buf(), classification: None, steps, error: None });
                return Ok(false);
            }
        }
    } else {
        steps.push(StepOutcome::skipped("decrypt", "already a plain ELF"));
        original
    };
    report.record_step("decrypt");

    let elf = match ps5bp_elf::parse(&plain) {
        Ok(elf) => elf,
        Err(e) => {
            steps.push(StepOutcome::skipped("parse", e.to_string()));
            report.record_step("parse");
            report.files.push(FileResult { path: path.to_path_buf(), classification: None, steps, error: Some(e.to_string()) });
            return Ok(false);
        }
    };
    steps.push(StepOutcome::ran("parse"));
    report.record_step("parse");

    let classification = ps5bp_analyze::analyze(
        &elf,
        config.source_fw,
        config.target_fw,
        &config.target_fw_label(),
        kb,
        exports,
        fakelibs,
    );
    steps.push(StepOutcome::ran("analyze"));
    report.record_step("analyze");

    if config.apply_bps {
        if let Some(db) = patch_db {
            let basename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if let Some(record) = db.find_patch(&config.source_fw_label(), &config.target_fw_label(), basename) {
                let patch_path = db.resolve_path(record);
                let patch_bytes = fs::read(&patch_path).map_err(|e| Error::io(&patch_path, e))?;
                plain = ps5bp_bps::apply_patch(&plain, &patch_bytes).map_err(OrchestratorError::Component)?;
                mutated = true;
                steps.push(StepOutcome::ran("bps"));
            } else {
                steps.push(StepOutcome::skipped("bps", "no matching patch record"));
            }
        } else {
            steps.push(StepOutcome::skipped("bps", "no patch database configured"));
        }
        report.record_step("bps");
    } else {
        steps.push(StepOutcome::skipped("bps", "not requested"));
    }

    // Re-parse if BPS relocated anything; indices computed above may be stale.
    let elf = if mutated { ps5bp_elf::parse(&plain).map_err(OrchestratorError::Component)? } else { elf };

    if config.stub_missing {
        let mut mode_by_nid: HashMap<String, ps5bp_common::StubMode> = HashMap::new();
        for lib in &classification.required_libraries {
            for missing in &lib.missing_symbols {
                let nid_key = if kb.lookup(&missing.name).is_some() {
                    compute_nid(&missing.name)
                } else {
                    missing.name.clone()
                };
                mode_by_nid.insert(nid_key.to_uppercase(), missing.stub_mode);
            }
        }

        let mut stubbed_count = 0u32;
        {
            let mut stubber = Stubber::new(&mut plain, &elf);
            for symbol in elf.imported_symbols() {
                let Some(decoded) = decode_import_name(&symbol.name) else { continue };
                let Some(&mode) = mode_by_nid.get(&decoded.nid.to_uppercase()) else { continue };
                if let ps5bp_stub::StubOutcome::Stubbed { .. } = stubber.stub_symbol(&elf, &symbol.name, mode) {
                    stubbed_count += 1;
                }
            }
        }
        if stubbed_count > 0 {
            mutated = true;
        }
        steps.push(StepOutcome::ran("stub"));
        report.record_step("stub");
    } else {
        steps.push(StepOutcome::skipped("stub", "not requested"));
    }

    if config.patch_sdk {
        if let Some(segment) = &elf.param_segment {
            match ps5bp_param::patch_sdk_words(&mut plain, segment, &config.target_fw_label()) {
                Ok(ps5bp_param::PatchOutcome::Patched) => {
                    mutated = true;
                    steps.push(StepOutcome::ran("sdk_patch"));
                }
                Ok(outcome) => steps.push(StepOutcome::skipped("sdk_patch", format!("{outcome:?}"))),
                Err(e) => steps.push(StepOutcome::skipped("sdk_patch", e.to_string())),
            }
        } else {
            steps.push(StepOutcome::skipped("sdk_patch", "no param segment in this ELF"));
        }
        report.record_step("sdk_patch");
    } else {
        steps.push(StepOutcome::skipped("sdk_patch", "disabled by default configuration"));
    }

    let final_bytes = if config.resign {
        let signed = fake_sign(&plain, &FakeSignOptions::default()).map_err(OrchestratorError::Component)?;
        mutated = true;
        steps.push(StepOutcome::ran("resign"));
        report.record_step("resign");
        signed
    } else {
        steps.push(StepOutcome::skipped("resign", "not requested"));
        plain
    };

    if mutated {
        fs::write(path, &final_bytes).map_err(|e| Error::io(path, e))?;
    }

    report.files.push(FileResult {
        path: path.to_path_buf(),
        classification: Some(classification),
        steps,
        error: None,
    });

    Ok(mutated)
}

fn install_fakelibs(fw_major: &str, game_dir: &Path, report: &mut PipelineReport) -> Option<PathBuf> {
    report.record_step("install_fakelibs");
    let Some(source) = find_fakelib_folder(fw_major, game_dir) else {
        warn!(fw_major, "no fakelib folder found; fakelibs must be installed manually");
        return None;
    };

    let dest = game_dir.join("fakelib");
    if fs::create_dir_all(&dest).is_err() {
        return Some(source);
    }

    for file in list_fakelib_files(&source) {
        let Some(name) = file.file_name() else { continue };
        if fs::copy(&file, dest.join(name)).is_ok() {
            report.fakelibs_installed.push(name.to_string_lossy().into_owned());
        }
    }

    Some(source)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).into_iter().filter_map(std::result::Result::ok) {
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        }
    }
    Ok(())
}

fn package_outputs(
    config: &PipelineConfig,
    working_dir: &Path,
    mutated_files: &[PathBuf],
    report: &PipelineReport,
) -> Result<Option<PathBuf>> {
    let fakelib_dir = working_dir.join("fakelib");
    let has_fakelibs = fakelib_dir.is_dir() && !report.fakelibs_installed.is_empty();

    if mutated_files.is_empty() && !has_fakelibs {
        info!("nothing was modified; skipping archive packaging");
        return Ok(None);
    }

    let archive_path = config.output_dir.join("backport_output.zip");
    let file = fs::File::create(&archive_path).map_err(|e| Error::io(&archive_path, e))?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    for path in mutated_files {
        let rel = path.strip_prefix(working_dir).unwrap_or(path);
        zip.start_file(rel.to_string_lossy(), options)?;
        let data = fs::read(path).map_err(|e| Error::io(path, e))?;
        zip.write_all(&data).map_err(|e| Error::io(path, e))?;
    }

    if has_fakelibs {
        for entry in WalkDir::new(&fakelib_dir).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(working_dir).unwrap_or(entry.path());
            zip.start_file(rel.to_string_lossy(), options)?;
            let data = fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            zip.write_all(&data).map_err(|e| Error::io(entry.path(), e))?;
        }
    }

    zip.finish()?;
    Ok(Some(archive_path))
}
