use std::collections::HashMap;
use std::str::FromStr;

use ps5bp_common::{compute_nid, FirmwareVersion, StubMode, StubRisk};

use crate::types::{Category, Classification, ClassificationSource, LibraryInfo, StaticSymbolInfo};

type RawEntry = (&'static str, &'static str, Category, &'static str, StubRisk, StubMode);

/// Starter set of well-known PS5 system functions, carried from the
/// reference toolkit's curated database. Extensible at runtime by merging
/// additional JSON-sourced entries; this seed is never re-derived.
const KNOWN_FUNCTIONS: &[RawEntry] = &[
    ("sceKernelLoadStartModule", "libkernel.sprx", Category::Kernel, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelStopUnloadModule", "libkernel.sprx", Category::Kernel, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelDlsym", "libkernel.sprx", Category::Kernel, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelJitCreateSharedMemory", "libkernel.sprx", Category::Kernel, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelJitCreateAliasOfSharedMemory", "libkernel.sprx", Category::Kernel, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelJitMapSharedMemory", "libkernel.sprx", Category::Kernel, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelMmap", "libkernel.sprx", Category::Memory, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelMunmap", "libkernel.sprx", Category::Memory, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelMprotect", "libkernel.sprx", Category::Memory, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelMapDirectMemory", "libkernel.sprx", Category::Memory, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelGetDirectMemorySize", "libkernel.sprx", Category::Memory, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceKernelBatchMap", "libkernel.sprx", Category::Memory, "3.00", StubRisk::High, StubMode::Skip),
    ("sceKernelBatchMap2", "libkernel.sprx", Category::Memory, "5.00", StubRisk::High, StubMode::Skip),
    ("sceKernelCreateEqueue", "libkernel.sprx", Category::Thread, "1.00", StubRisk::Critical, StubMode::Skip),
    ("scePthreadCreate", "libkernel.sprx", Category::Thread, "1.00", StubRisk::Critical, StubMode::Skip),
    ("scePthreadMutexLock", "libkernel.sprx", Category::Thread, "1.00", StubRisk::Critical, StubMode::Skip),
    ("scePthreadMutexUnlock", "libkernel.sprx", Category::Thread, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelSleep", "libkernel.sprx", Category::Thread, "1.00", StubRisk::Safe, StubMode::RetZero),
    ("sceKernelUsleep", "libkernel.sprx", Category::Thread, "1.00", StubRisk::Safe, StubMode::RetZero),
    ("sceKernelClockGettime", "libkernel.sprx", Category::System, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceKernelOpen", "libkernel.sprx", Category::Filesystem, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelClose", "libkernel.sprx", Category::Filesystem, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelRead", "libkernel.sprx", Category::Filesystem, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceKernelWrite", "libkernel.sprx", Category::Filesystem, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceAgcInitialize", "libSceAgc.sprx", Category::Gpu, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceAgcSubmitCommandBuffers", "libSceAgc.sprx", Category::Gpu, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceAgcGetLastError", "libSceAgc.sprx", Category::Gpu, "1.00", StubRisk::Safe, StubMode::RetZero),
    ("sceAgcSubmitAsc", "libSceAgc.sprx", Category::Gpu, "4.00", StubRisk::Critical, StubMode::Skip),
    ("sceAgcSetGraphicsShader", "libSceAgc.sprx", Category::Gpu, "9.00", StubRisk::Critical, StubMode::Skip),
    ("sceAgcDriverInitialize", "libSceAgcDriver.sprx", Category::Gpu, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceGnmSubmitCommandBuffers", "libSceGnmDriver.sprx", Category::Gpu, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceVideoOutOpen", "libSceVideoOut.sprx", Category::Video, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceVideoOutSubmitFlip", "libSceVideoOut.sprx", Category::Video, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceVideoOutGetFlipStatus", "libSceVideoOut.sprx", Category::Video, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceVideoOutSubmitEopFlip", "libSceVideoOut.sprx", Category::Video, "7.00", StubRisk::Critical, StubMode::Skip),
    ("sceAudioOutInit", "libSceAudioOut.sprx", Category::Audio, "1.00", StubRisk::High, StubMode::RetZero),
    ("sceAudioOutOpen", "libSceAudioOut.sprx", Category::Audio, "1.00", StubRisk::High, StubMode::Skip),
    ("sceNpAuthCreateAsyncRequest", "libSceNpAuth.sprx", Category::NpPlatform, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceNpAuthGetAuthorizationCode", "libSceNpAuth.sprx", Category::NpPlatform, "1.00", StubRisk::Low, StubMode::RetError),
    ("sceNpAuthGetAuthorizationCodeV3", "libSceNpAuth.sprx", Category::NpPlatform, "4.00", StubRisk::Low, StubMode::RetError),
    ("sceNpTrophyUnlockTrophy", "libSceNpTrophy.sprx", Category::Trophy, "1.00", StubRisk::Safe, StubMode::RetZero),
    ("sceNpTrophyCaptureScreenshot", "libSceNpTrophy.sprx", Category::Trophy, "3.00", StubRisk::Safe, StubMode::RetZero),
    ("sceSaveDataMount", "libSceSaveData.sprx", Category::SaveData, "1.00", StubRisk::Medium, StubMode::RetError),
    ("sceSaveDataMount5", "libSceSaveData.sprx", Category::SaveData, "5.00", StubRisk::Medium, StubMode::RetError),
    ("sceSaveDataMount6", "libSceSaveData.sprx", Category::SaveData, "9.00", StubRisk::Medium, StubMode::RetError),
    ("scePadRead", "libScePad.sprx", Category::Controller, "1.00", StubRisk::Critical, StubMode::Skip),
    ("scePadSetVibration", "libScePad.sprx", Category::Controller, "1.00", StubRisk::Safe, StubMode::RetZero),
    ("scePadGetCapability", "libScePad.sprx", Category::Controller, "5.00", StubRisk::Safe, StubMode::RetZero),
    ("sceUserServiceGetInitialUser", "libSceUserService.sprx", Category::System, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceSystemServiceLoadExec", "libSceSystemService.sprx", Category::System, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceNetSocket", "libSceNet.sprx", Category::Network, "1.00", StubRisk::High, StubMode::RetError),
    ("sceHttpSendRequest", "libSceHttp.sprx", Category::Http, "1.00", StubRisk::Medium, StubMode::RetError),
    ("sceSslInit", "libSceSsl.sprx", Category::Ssl, "1.00", StubRisk::Medium, StubMode::RetZero),
    ("sceFiberRun", "libSceFiber.sprx", Category::Fiber, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceFiberSwitch", "libSceFiber.sprx", Category::Fiber, "1.00", StubRisk::Critical, StubMode::Skip),
    ("sceImeDialogInit", "libSceIme.sprx", Category::Dialog, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceMsgDialogOpen", "libSceMsgDialog.sprx", Category::Dialog, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceCommonDialogInitialize", "libSceCommonDialog.sprx", Category::Dialog, "1.00", StubRisk::Low, StubMode::RetZero),
    ("sceNpWebApiSendRequest", "libSceNpWebApi.sprx", Category::NpPlatform, "1.00", StubRisk::Low, StubMode::RetError),
    ("sceNpWebApiCreateMultipartRequest", "libSceNpWebApi.sprx", Category::NpPlatform, "10.00", StubRisk::Low, StubMode::RetError),
    ("sceAppContentAddcontMount", "libSceAppContent.sprx", Category::System, "1.00", StubRisk::Medium, StubMode::RetError),
    ("sceRtcGetCurrentTick", "libSceRtc.sprx", Category::System, "1.00", StubRisk::Low, StubMode::RetZero),
    ("scePlayGoOpen", "libScePlayGo.sprx", Category::System, "1.00", StubRisk::Medium, StubMode::RetZero),
    ("sceScreenShotEnable", "libSceScreenShot.sprx", Category::System, "1.00", StubRisk::Safe, StubMode::RetZero),
];

/// Prefix-based classification for unknown symbols, most specific first.
/// First match wins; ordering is load-bearing.
const PREFIX_HEURISTICS: &[(&str, Category, StubRisk, StubMode)] = &[
    ("sceKernelLoad", Category::Kernel, StubRisk::Critical, StubMode::Skip),
    ("sceKernelDlsym", Category::Kernel, StubRisk::Critical, StubMode::Skip),
    ("sceKernelJit", Category::Kernel, StubRisk::Critical, StubMode::Skip),
    ("sceKernelMmap", Category::Memory, StubRisk::Critical, StubMode::Skip),
    ("sceKernelMapDirect", Category::Memory, StubRisk::Critical, StubMode::Skip),
    ("sceKernelAllocate", Category::Memory, StubRisk::Critical, StubMode::Skip),
    ("sceAgcSubmit", Category::Gpu, StubRisk::Critical, StubMode::Skip),
    ("sceAgcDraw", Category::Gpu, StubRisk::Critical, StubMode::Skip),
    ("sceAgcDispatch", Category::Gpu, StubRisk::Critical, StubMode::Skip),
    ("sceAgcSet", Category::Gpu, StubRisk::Critical, StubMode::Skip),
    ("sceAgcDingDong", Category::Gpu, StubRisk::Critical, StubMode::Skip),
    ("sceGnmSubmit", Category::Gpu, StubRisk::Critical, StubMode::Skip),
    ("sceFiberRun", Category::Fiber, StubRisk::Critical, StubMode::Skip),
    ("sceFiberSwitch", Category::Fiber, StubRisk::Critical, StubMode::Skip),
    ("scePadRead", Category::Controller, StubRisk::Critical, StubMode::Skip),
    ("sceVideoOutRegister", Category::Video, StubRisk::Critical, StubMode::Skip),
    ("sceVideoOutSubmit", Category::Video, StubRisk::Critical, StubMode::Skip),
    ("sceVideoOutOpen", Category::Video, StubRisk::Critical, StubMode::Skip),
    ("sceKernelOpen", Category::Filesystem, StubRisk::Critical, StubMode::Skip),
    ("sceKernelRead", Category::Filesystem, StubRisk::Critical, StubMode::Skip),
    ("sceKernelWrite", Category::Filesystem, StubRisk::Critical, StubMode::Skip),
    ("sceKernelCreate", Category::Kernel, StubRisk::High, StubMode::Skip),
    ("scePthreadCreate", Category::Thread, StubRisk::Critical, StubMode::Skip),
    ("scePthreadMutex", Category::Thread, StubRisk::High, StubMode::Skip),
    ("scePthreadCond", Category::Thread, StubRisk::High, StubMode::Skip),
    ("sceNpTrophy", Category::Trophy, StubRisk::Safe, StubMode::RetZero),
    ("sceScreenShot", Category::System, StubRisk::Safe, StubMode::RetZero),
    ("sceNpCommerce", Category::NpPlatform, StubRisk::Safe, StubMode::RetZero),
    ("sceMsgDialog", Category::Dialog, StubRisk::Safe, StubMode::RetZero),
    ("sceImeDialog", Category::Dialog, StubRisk::Safe, StubMode::RetZero),
    ("sceNpAuth", Category::NpPlatform, StubRisk::Low, StubMode::RetZero),
    ("sceNpManager", Category::NpPlatform, StubRisk::Low, StubMode::RetZero),
    ("sceNpWebApi", Category::NpPlatform, StubRisk::Low, StubMode::RetError),
    ("sceNpMatching", Category::NpPlatform, StubRisk::Low, StubMode::RetZero),
    ("sceNpSignaling", Category::NpPlatform, StubRisk::Low, StubMode::RetZero),
    ("sceNp", Category::NpPlatform, StubRisk::Low, StubMode::RetZero),
    ("sceUserService", Category::System, StubRisk::Low, StubMode::RetZero),
    ("sceRtc", Category::System, StubRisk::Low, StubMode::RetZero),
    ("scePlayGo", Category::System, StubRisk::Low, StubMode::RetZero),
    ("sceCommonDialog", Category::Dialog, StubRisk::Low, StubMode::RetZero),
    ("sceSaveData", Category::SaveData, StubRisk::Medium, StubMode::RetError),
    ("sceHttp", Category::Http, StubRisk::Medium, StubMode::RetError),
    ("sceSsl", Category::Ssl, StubRisk::Medium, StubMode::RetZero),
    ("sceNet", Category::Network, StubRisk::Medium, StubMode::RetError),
    ("scePad", Category::Controller, StubRisk::Medium, StubMode::RetZero),
    ("sceAudioOut", Category::Audio, StubRisk::Medium, StubMode::RetZero),
    ("sceAppContent", Category::System, StubRisk::Medium, StubMode::RetZero),
    ("sceAgcDriver", Category::Gpu, StubRisk::High, StubMode::Skip),
    ("sceAgc", Category::Gpu, StubRisk::High, StubMode::Skip),
    ("sceGnm", Category::Gpu, StubRisk::High, StubMode::Skip),
    ("sceVideoOut", Category::Video, StubRisk::High, StubMode::RetZero),
    ("sceFiber", Category::Fiber, StubRisk::High, StubMode::Skip),
    ("sceSystemService", Category::System, StubRisk::Medium, StubMode::RetZero),
    ("sceIme", Category::Ime, StubRisk::Low, StubMode::RetZero),
    ("sceKernel", Category::Kernel, StubRisk::High, StubMode::Skip),
];

/// Suffix-based classification, applied only when no prefix matches.
const SUFFIX_HEURISTICS: &[(&str, StubRisk, StubMode)] = &[
    ("Initialize", StubRisk::Low, StubMode::RetZero),
    ("Init", StubRisk::Low, StubMode::RetZero),
    ("Terminate", StubRisk::Low, StubMode::RetZero),
    ("Term", StubRisk::Low, StubMode::RetZero),
    ("Finalize", StubRisk::Low, StubMode::RetZero),
    ("Destroy", StubRisk::Low, StubMode::RetZero),
    ("Delete", StubRisk::Low, StubMode::RetZero),
    ("Free", StubRisk::Low, StubMode::Nop),
    ("Close", StubRisk::Low, StubMode::RetZero),
    ("GetStatus", StubRisk::Low, StubMode::RetZero),
    ("GetResult", StubRisk::Low, StubMode::RetZero),
    ("GetInfo", StubRisk::Low, StubMode::RetZero),
    ("GetState", StubRisk::Low, StubMode::RetZero),
    ("GetParam", StubRisk::Low, StubMode::RetZero),
    ("SetParam", StubRisk::Low, StubMode::RetZero),
    ("Poll", StubRisk::Safe, StubMode::RetZero),
    ("Wait", StubRisk::Safe, StubMode::RetZero),
    ("UpdateStatus", StubRisk::Safe, StubMode::RetZero),
    ("SetVibration", StubRisk::Safe, StubMode::RetZero),
    ("SetLightBar", StubRisk::Safe, StubMode::RetZero),
    ("ResetLightBar", StubRisk::Safe, StubMode::RetZero),
    ("Disable", StubRisk::Safe, StubMode::RetZero),
    ("Enable", StubRisk::Safe, StubMode::RetZero),
];

/// Known-library metadata, covering the system libraries the original
/// toolkit recognized by filename.
const KNOWN_LIBRARIES: &[(&str, Category, bool, &str)] = &[
    ("libkernel.sprx", Category::Kernel, true, "PS5 Kernel"),
    ("libSceAgc.sprx", Category::Gpu, true, "AMD GPU Commands"),
    ("libSceAgcDriver.sprx", Category::Gpu, true, "AGC Driver Interface"),
    ("libSceGnmDriver.sprx", Category::Gpu, true, "GNM GPU Driver (PS4 compat)"),
    ("libSceVideoOut.sprx", Category::Video, true, "Video Output"),
    ("libSceAudioOut.sprx", Category::Audio, false, "Audio Output"),
    ("libScePad.sprx", Category::Controller, true, "Controller Input"),
    ("libSceUserService.sprx", Category::System, true, "User Service"),
    ("libSceSystemService.sprx", Category::System, true, "System Service"),
    ("libSceNpAuth.sprx", Category::NpPlatform, false, "NP Authentication"),
    ("libSceNpTrophy.sprx", Category::Trophy, false, "Trophy System"),
    ("libSceSaveData.sprx", Category::SaveData, false, "Save Data"),
    ("libSceSaveData.native.sprx", Category::SaveData, false, "Save Data (Native)"),
    ("libSceNet.sprx", Category::Network, false, "Network"),
    ("libSceHttp.sprx", Category::Http, false, "HTTP Client"),
    ("libSceSsl.sprx", Category::Ssl, false, "SSL/TLS"),
    ("libSceFiber.sprx", Category::Fiber, false, "Fiber (Coroutine)"),
    ("libSceIme.sprx", Category::Ime, false, "Input Method"),
    ("libSceMsgDialog.sprx", Category::Dialog, false, "Message Dialog"),
    ("libSceCommonDialog.sprx", Category::Dialog, false, "Common Dialog"),
    ("libSceNpManager.sprx", Category::NpPlatform, false, "NP Manager"),
    ("libSceNpWebApi.sprx", Category::NpPlatform, false, "NP Web API"),
    ("libSceNpCommerce.sprx", Category::NpPlatform, false, "NP Commerce"),
    ("libSceNpSignaling.sprx", Category::NpPlatform, false, "NP Signaling"),
    ("libSceNpMatching2.sprx", Category::NpPlatform, false, "NP Matchmaking"),
    ("libSceAppContent.sprx", Category::System, false, "App Content / DLC"),
    ("libSceRtc.sprx", Category::System, false, "Real-Time Clock"),
    ("libScePlayGo.sprx", Category::System, false, "PlayGo Streaming"),
    ("libSceScreenShot.sprx", Category::System, false, "Screenshot"),
    ("libSceJson.sprx", Category::Misc, false, "JSON Parser"),
    ("libSceJson2.sprx", Category::Misc, false, "JSON Parser v2"),
    ("libSceLibcInternal.sprx", Category::System, true, "Internal libc"),
    ("libScePosix.sprx", Category::System, true, "POSIX Layer"),
];

/// Libraries whose ABI changes across major firmware revisions closely
/// enough that a drop-in fakelib replacement is required on any firmware
/// downgrade, rather than relying on PLT stubbing alone.
pub const FAKELIB_REQUIRED: &[&str] = &["libSceAgc", "libSceAgcDriver", "libSceGnmDriver", "libSceFiber"];

/// Substring-based fallback classifier for libraries absent from
/// [`KNOWN_LIBRARIES`].
pub fn guess_category(library_name: &str) -> Category {
    let lower = library_name.to_ascii_lowercase();
    let pairs: &[(&str, Category)] = &[
        ("gnm", Category::Gpu),
        ("agc", Category::Gpu),
        ("gpu", Category::Gpu),
        ("video", Category::Video),
        ("audio", Category::Audio),
        ("kernel", Category::Kernel),
        ("pad", Category::Controller),
        ("net", Category::Network),
        ("http", Category::Http),
        ("ssl", Category::Ssl),
        ("trophy", Category::Trophy),
        ("savedata", Category::SaveData),
        ("np", Category::NpPlatform),
        ("dialog", Category::Dialog),
        ("fiber", Category::Fiber),
        ("system", Category::System),
    ];
    pairs
        .iter()
        .find(|(substr, _)| lower.contains(substr))
        .map(|(_, cat)| *cat)
        .unwrap_or(Category::Misc)
}

/// Curated static symbol knowledge base, built once and held read-only.
pub struct StaticKnowledgeBase {
    by_name: HashMap<&'static str, StaticSymbolInfo>,
    by_nid: HashMap<String, &'static str>,
}

impl StaticKnowledgeBase {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let mut by_nid = HashMap::new();
        for &(name, library, category, min_fw, stub_risk, stub_mode) in KNOWN_FUNCTIONS {
            let min_firmware = FirmwareVersion::from_str(min_fw).expect("valid seed firmware string");
            by_name.insert(
                name,
                StaticSymbolInfo {
                    library,
                    category,
                    min_firmware,
                    stub_risk,
                    stub_mode,
                },
            );
            by_nid.insert(compute_nid(name), name);
        }
        StaticKnowledgeBase { by_name, by_nid }
    }

    /// Resolves a NID back to the function name that produces it, if known.
    pub fn resolve_nid(&self, nid: &str) -> Option<&'static str> {
        self.by_nid.get(&nid.to_ascii_uppercase()).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&StaticSymbolInfo> {
        self.by_name.get(name)
    }

    /// Classifies a symbol name: exact database match, else ordered prefix
    /// heuristic (first match wins), else suffix heuristic, else a default
    /// medium-risk ret-zero classification.
    pub fn classify(&self, name: &str) -> Classification {
        if let Some(info) = self.lookup(name) {
            return Classification {
                category: info.category,
                stub_risk: info.stub_risk,
                stub_mode: info.stub_mode,
                source: ClassificationSource::Database,
                library: Some(info.library),
                min_firmware: Some(info.min_firmware),
            };
        }

        if let Some(&(_, category, stub_risk, stub_mode)) =
            PREFIX_HEURISTICS.iter().find(|(prefix, ..)| name.starts_with(prefix))
        {
            return Classification {
                category,
                stub_risk,
                stub_mode,
                source: ClassificationSource::HeuristicPrefix,
                library: None,
                min_firmware: None,
            };
        }

        if let Some(&(_, stub_risk, stub_mode)) =
            SUFFIX_HEURISTICS.iter().find(|(suffix, ..)| name.ends_with(suffix))
        {
            return Classification {
                category: Category::Misc,
                stub_risk,
                stub_mode,
                source: ClassificationSource::HeuristicSuffix,
                library: None,
                min_firmware: None,
            };
        }

        Classification {
            category: Category::Misc,
            stub_risk: StubRisk::Medium,
            stub_mode: StubMode::RetZero,
            source: ClassificationSource::Unknown,
            library: None,
            min_firmware: None,
        }
    }

    /// True if `name` is available on `target_fw`, or if the function is
    /// unknown to the database (an unknown function is assumed available).
    pub fn is_available(&self, name: &str, target_fw: FirmwareVersion) -> bool {
        match self.lookup(name) {
            Some(info) => target_fw >= info.min_firmware,
            None => true,
        }
    }

    /// Filters `names` down to those not available on `target_fw`.
    pub fn missing_for_firmware<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
        target_fw: FirmwareVersion,
    ) -> Vec<(&'a str, Classification)> {
        names
            .into_iter()
            .filter_map(|name| {
                let info = self.lookup(name)?;
                if target_fw < info.min_firmware {
                    Some((name, self.classify(name)))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn library_info(&self, library_name: &str) -> Option<LibraryInfo> {
        KNOWN_LIBRARIES
            .iter()
            .find(|(name, ..)| *name == library_name)
            .map(|&(_, category, essential, description)| LibraryInfo {
                category,
                essential,
                description,
            })
    }
}

impl Default for StaticKnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps5bp_common::{StubMode, StubRisk};

    #[test]
    fn resolves_known_nid() {
        let db = StaticKnowledgeBase::new();
        let nid = compute_nid("sceKernelLoadStartModule");
        assert_eq!(db.resolve_nid(&nid), Some("sceKernelLoadStartModule"));
    }

    #[test]
    fn prefix_heuristic_first_match_wins_over_generic_kernel() {
        let db = StaticKnowledgeBase::new();
        let c = db.classify("sceKernelLoadSomethingNew");
        assert_eq!(c.stub_mode, StubMode::Skip);
        assert_eq!(c.stub_risk, StubRisk::Critical);
        assert!(matches!(c.source, ClassificationSource::HeuristicPrefix));
    }

    #[test]
    fn suffix_heuristic_applies_when_no_prefix_matches() {
        let db = StaticKnowledgeBase::new();
        let c = db.classify("sceFooBarInitialize");
        assert_eq!(c.stub_mode, StubMode::RetZero);
        assert!(matches!(c.source, ClassificationSource::HeuristicSuffix));
    }

    #[test]
    fn unknown_symbol_defaults_to_medium_ret_zero() {
        let db = StaticKnowledgeBase::new();
        let c = db.classify("totallyUnrecognizedSymbol");
        assert_eq!(c.stub_risk, StubRisk::Medium);
        assert_eq!(c.stub_mode, StubMode::RetZero);
        assert!(matches!(c.source, ClassificationSource::Unknown));
    }

    #[test]
    fn unknown_function_assumed_available() {
        let db = StaticKnowledgeBase::new();
        assert!(db.is_available("totallyUnrecognizedSymbol", FirmwareVersion::new(1, 0)));
    }
}
