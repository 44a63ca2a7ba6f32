use std::collections::BTreeMap;

use ps5bp_common::{firmware_gap, firmware_gap_level, FirmwareVersion, StubMode, StubRisk};
use ps5bp_elf::{decode_import_name, ElfInfo};
use ps5bp_fwdb::{Category, ClassificationSource, FakelibAvailability, FirmwareExports, StaticKnowledgeBase};

use crate::systems::{is_gpu_command_library, is_system_provided};
use crate::types::{AnalysisRisk, ClassificationSourceDto, FileReport, LibraryReport, MissingSymbol, RecommendedAction};

/// Finds the `needed_libraries` entry whose base name matches an encoded
/// import's library suffix, e.g. suffix `"libkernel"` against
/// `"libkernel.sprx"`. Falls back to the suffix itself with `.sprx`
/// appended when no declared `DT_NEEDED` entry matches, which happens for
/// malformed or hand-edited binaries.
fn resolve_owning_library(needed_libraries: &[String], suffix: &str) -> String {
    needed_libraries
        .iter()
        .find(|lib| {
            let base = lib.strip_suffix(".sprx").or_else(|| lib.strip_suffix(".prx")).unwrap_or(lib);
            base.eq_ignore_ascii_case(suffix)
        })
        .cloned()
        .unwrap_or_else(|| format!("{suffix}.sprx"))
}

/// Runs the full compatibility analysis for one parsed ELF against a
/// target firmware, using the static knowledge base, that firmware's
/// exports (if available), and the fakelib availability table.
pub fn analyze(
    elf: &ElfInfo,
    source_fw: FirmwareVersion,
    target_fw: FirmwareVersion,
    target_fw_label: &str,
    kb: &StaticKnowledgeBase,
    exports: &FirmwareExports,
    fakelibs: &FakelibAvailability,
) -> FileReport {
    let fw_gap = firmware_gap(&source_fw, &target_fw);
    let fw_gap_level = firmware_gap_level(fw_gap);
    let fw_major = target_fw.major.to_string();

    let mut by_library: BTreeMap<String, Vec<MissingSymbol>> = BTreeMap::new();
    for lib in &elf.needed_libraries {
        by_library.entry(lib.clone()).or_default();
    }

    for symbol in elf.imported_symbols() {
        let Some(decoded) = decode_import_name(&symbol.name) else {
            continue;
        };
        let owning_library = resolve_owning_library(&elf.needed_libraries, &decoded.library_suffix);

        if exports.has_nid(&owning_library, &decoded.nid) {
            by_library.entry(owning_library).or_default();
            continue;
        }

        let missing = match kb.resolve_nid(&decoded.nid) {
            Some(name) => {
                let c = kb.classify(name);
                MissingSymbol {
                    name: name.to_string(),
                    category: c.category,
                    stub_risk: c.stub_risk,
                    stub_mode: c.stub_mode,
                    source: ClassificationSourceDto::from(c.source),
                }
            }
            None => MissingSymbol {
                name: decoded.nid.clone(),
                category: Category::Misc,
                stub_risk: StubRisk::Medium,
                stub_mode: StubMode::RetZero,
                source: ClassificationSourceDto::from(ClassificationSource::Unknown),
            },
        };
        by_library.entry(owning_library).or_default().push(missing);
    }

    let mut required_libraries = Vec::with_capacity(by_library.len());
    let mut also_recommend = Vec::new();
    let mut warnings = Vec::new();

    for (library, missing_symbols) in by_library {
        let info = kb.library_info(&library);
        let category = info.map(|i| i.category).unwrap_or_else(|| ps5bp_fwdb::guess_category(&library));
        let essential = info.map(|i| i.essential).unwrap_or(false);
        let has_fakelib = fakelibs.is_available(&fw_major, &library);
        let needs_fakelib_type = ps5bp_fwdb::requires_fakelib(&library);
        let critical_missing_count = missing_symbols.iter().filter(|s| s.stub_risk == StubRisk::Critical).count();
        let system_provided = is_system_provided(&library);

        let (risk, score, action) = if has_fakelib {
            (AnalysisRisk::Low, 90, RecommendedAction::UseFakelib)
        } else if needs_fakelib_type && fw_gap >= 2 {
            (AnalysisRisk::Critical, 15, RecommendedAction::FakelibNeeded)
        } else if needs_fakelib_type {
            (AnalysisRisk::High, 40, RecommendedAction::FakelibNeeded)
        } else if critical_missing_count > 0 {
            (AnalysisRisk::High, 40, RecommendedAction::StubRisky)
        } else if !missing_symbols.is_empty() {
            (AnalysisRisk::Medium, 70, RecommendedAction::StubFunctions)
        } else if fw_gap >= 4 && !system_provided && !matches!(category, Category::Misc) {
            (AnalysisRisk::Low, 80, RecommendedAction::CheckCompat)
        } else {
            (AnalysisRisk::None, 100, RecommendedAction::None)
        };

        // essential kernel/gpu libraries with no fakelib escalate even
        // without a specific missing symbol, unless they're system-provided
        // (e.g. libkernel.sprx, present on every firmware and never
        // registered in the fakelib set).
        let (risk, score, action) = if !has_fakelib
            && essential
            && !system_provided
            && matches!(category, Category::Kernel | Category::Gpu)
            && matches!(action, RecommendedAction::None | RecommendedAction::CheckCompat)
        {
            (AnalysisRisk::Critical, 15, RecommendedAction::FakelibNeeded)
        } else if !has_fakelib && !system_provided && is_gpu_command_library(&library) && fw_gap >= 2 && matches!(action, RecommendedAction::None | RecommendedAction::CheckCompat)
        {
            (AnalysisRisk::Critical, 15, RecommendedAction::FakelibNeeded)
        } else {
            (risk, score, action)
        };

        required_libraries.push(LibraryReport {
            library,
            category,
            essential,
            has_fakelib,
            missing_symbols,
            risk,
            score,
            action,
        });
    }

    for &req in ps5bp_fwdb::FAKELIB_REQUIRED {
        if fakelibs.is_available(&fw_major, req)
            && !required_libraries.iter().any(|r| r.library.starts_with(req))
        {
            also_recommend.push(req.to_string());
        }
    }

    let n_libraries = required_libraries.len().max(1);
    let overall_score = required_libraries.iter().map(|r| r.score).sum::<u32>() / n_libraries as u32;
    let overall_risk = required_libraries
        .iter()
        .map(|r| r.risk)
        .max()
        .unwrap_or(AnalysisRisk::None);

    if fw_gap_level >= ps5bp_common::FirmwareGapLevel::Huge {
        warnings.push(format!(
            "firmware gap is huge ({fw_gap} major versions); compatibility is unlikely without fakelibs"
        ));
    } else if fw_gap_level >= ps5bp_common::FirmwareGapLevel::Large {
        warnings.push(format!("firmware gap is large ({fw_gap} major versions); review stubbed symbols carefully"));
    }
    if !fakelibs.has_any_for(&fw_major) {
        warnings.push(format!("no fakelibs registered for firmware {target_fw_label}"));
    }

    FileReport {
        required_libraries,
        fw_gap,
        fw_gap_level,
        overall_score,
        overall_risk,
        also_recommend,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps5bp_common::Arch;
    use ps5bp_elf::{ElfInfo, Symbol, SymbolBinding, SymbolKind};

    fn empty_elf(needed: &[&str], symbols: Vec<Symbol>) -> ElfInfo {
        ElfInfo {
            arch: Arch::X86_64,
            e_type: 0xFE10,
            loadable_segments: vec![],
            executable_segments: vec![],
            needed_libraries: needed.iter().map(|s| s.to_string()).collect(),
            symbols,
            plt_relocations: vec![],
            param_segment: None,
        }
    }

    #[test]
    fn huge_gap_emits_warning_and_severity() {
        let elf = empty_elf(&["libkernel.sprx"], vec![]);
        let kb = StaticKnowledgeBase::new();
        let exports = FirmwareExports::default();
        let fakelibs = FakelibAvailability::default();
        let report = analyze(
            &elf,
            FirmwareVersion::new(9, 60),
            FirmwareVersion::new(4, 0),
            "4.00",
            &kb,
            &exports,
            &fakelibs,
        );
        assert_eq!(report.fw_gap, 5);
        assert_eq!(report.fw_gap_level, ps5bp_common::FirmwareGapLevel::Huge);
        assert!(report.warnings.iter().any(|w| w.contains("huge")));
    }

    #[test]
    fn missing_symbol_without_fakelib_recommends_stub_functions() {
        let nid = ps5bp_common::compute_nid("sceSomeRandomThing");
        let name = format!("{nid}#libSceSaveData#libSceSaveData");
        let symbol = Symbol {
            name,
            binding: SymbolBinding::Global,
            kind: SymbolKind::Function,
            section_index: 0,
            value: 0,
            size: 0,
        };
        let elf = empty_elf(&["libSceSaveData.sprx"], vec![symbol]);
        let kb = StaticKnowledgeBase::new();
        let exports = FirmwareExports::default();
        let fakelibs = FakelibAvailability::default();
        let report = analyze(
            &elf,
            FirmwareVersion::new(9, 0),
            FirmwareVersion::new(7, 0),
            "7.00",
            &kb,
            &exports,
            &fakelibs,
        );
        let lib = report
            .required_libraries
            .iter()
            .find(|r| r.library == "libSceSaveData.sprx")
            .unwrap();
        assert_eq!(lib.action, RecommendedAction::StubFunctions);
        assert_eq!(lib.missing_symbols.len(), 1);
    }

    #[test]
    fn symbol_present_in_target_exports_is_not_missing() {
        let nid = ps5bp_common::compute_nid("sceKernelExit");
        let name = format!("{nid}#libkernel#libkernel");
        let symbol = Symbol {
            name,
            binding: SymbolBinding::Global,
            kind: SymbolKind::Function,
            section_index: 0,
            value: 0,
            size: 0,
        };
        let elf = empty_elf(&["libkernel.sprx"], vec![symbol]);
        let kb = StaticKnowledgeBase::new();
        let mut exports = FirmwareExports::default();
        exports.insert("libkernel.sprx", "sceKernelExit", nid.clone());
        let fakelibs = FakelibAvailability::default();
        let report = analyze(
            &elf,
            FirmwareVersion::new(9, 0),
            FirmwareVersion::new(7, 0),
            "7.00",
            &kb,
            &exports,
            &fakelibs,
        );
        let lib = report.required_libraries.iter().find(|r| r.library == "libkernel.sprx").unwrap();
        assert!(lib.missing_symbols.is_empty());
    }

    #[test]
    fn system_provided_essential_library_is_not_escalated_without_a_finding() {
        let elf = empty_elf(&["libkernel.sprx"], vec![]);
        let kb = StaticKnowledgeBase::new();
        let exports = FirmwareExports::default();
        let fakelibs = FakelibAvailability::default();
        let report = analyze(
            &elf,
            FirmwareVersion::new(8, 0),
            FirmwareVersion::new(7, 0),
            "7.00",
            &kb,
            &exports,
            &fakelibs,
        );
        let lib = report.required_libraries.iter().find(|r| r.library == "libkernel.sprx").unwrap();
        assert_eq!(lib.action, RecommendedAction::None);
        assert_eq!(lib.risk, AnalysisRisk::None);
    }
}
