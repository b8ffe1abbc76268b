use std::cmp::Ordering;
use std::env;
use std::process::Command;

// Instruction-set tiers the crate ships kernels for
#[derive(PartialEq, Eq, Debug)]
struct Tier {
    name: &'static str,
    arch: &'static [&'static str],
    target_feature: &'static str,
    cfg_flag: &'static str,
    enabled: bool,
}

impl Tier {
    // Lowest number == highest priority
    fn priority(&self) -> usize {
        match self.cfg_flag {
            "avx2" => 0,
            "sse" => 1,
            "neon" => 2,
            _ => usize::MAX,
        }
    }

    fn tiers() -> Vec<Tier> {
        vec![
            Tier {
                name: "sse2",
                arch: &["x86", "x86_64"],
                target_feature: "sse2",
                cfg_flag: "sse",
                enabled: false,
            },
            Tier {
                name: "avx2",
                arch: &["x86", "x86_64"],
                target_feature: "avx2",
                cfg_flag: "avx2",
                enabled: false,
            },
            Tier {
                name: "neon",
                arch: &["aarch64"],
                target_feature: "neon",
                cfg_flag: "neon",
                enabled: false,
            },
        ]
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Host feature detection, only used to report features the target leaves unused
trait HostFeatureDetector {
    fn detect(&self, names: &[&'static str]) -> Vec<&'static str>;
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl HostFeatureDetector for LinuxDetector {
    fn detect(&self, names: &[&'static str]) -> Vec<&'static str> {
        let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") else {
            return Vec::new();
        };

        let flags: Vec<String> = cpuinfo
            .lines()
            .filter(|line| line.starts_with("flags") || line.starts_with("Features"))
            .flat_map(|line| line.split_whitespace().map(str::to_lowercase))
            .collect();

        names
            .iter()
            .copied()
            .filter(|name| {
                let wanted = match *name {
                    "neon" => "asimd",
                    other => other,
                };
                flags.iter().any(|flag| flag == wanted)
            })
            .collect()
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl HostFeatureDetector for MacOSDetector {
    fn detect(&self, names: &[&'static str]) -> Vec<&'static str> {
        let Ok(output) = Command::new("sysctl").args(["-a"]).output() else {
            return Vec::new();
        };

        let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

        names
            .iter()
            .copied()
            .filter(|name| match *name {
                "avx2" => contents.contains("hw.optional.avx2_0: 1"),
                "sse2" => contents.contains("hw.optional.sse2: 1"),
                "neon" => contents.contains("hw.optional.neon: 1"),
                _ => false,
            })
            .collect()
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct TierSelector;
impl TierSelector {
    fn host_detectors() -> Vec<Box<dyn HostFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn host_features(names: &[&'static str]) -> Vec<&'static str> {
        Self::host_detectors()
            .into_iter()
            .find(|detector| detector.is_applicable())
            .map(|detector| detector.detect(names))
            .unwrap_or_default()
    }

    // Marks the tiers whose instructions are legal for the compile target
    fn resolve(tiers: &mut [Tier], arch: &str, target_features: &[&str]) {
        for tier in tiers.iter_mut() {
            tier.enabled = tier.arch.iter().any(|candidate| *candidate == arch)
                && target_features.contains(&tier.target_feature);
        }
    }

    fn apply(tiers: &mut [Tier], forced_fallback: bool) {
        tiers.sort();

        let enabled: Vec<&Tier> = tiers
            .iter()
            .filter(|tier| tier.enabled && !forced_fallback)
            .collect();

        if enabled.is_empty() {
            println!("applying: fallback");
            println!("cargo:rustc-cfg=fallback");
        } else {
            for tier in enabled {
                println!("applying: {}", tier.cfg_flag);
                println!("cargo:rustc-cfg={}", tier.cfg_flag);
            }
        }

        println!("cargo::rustc-check-cfg=cfg(bitscan)");
        println!("cargo::rustc-check-cfg=cfg(hw_popcnt)");
        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(sse)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=AVEL_FORCE_FALLBACK");

    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let target_features = env::var("CARGO_CFG_TARGET_FEATURE").unwrap_or_default();
    let target_features: Vec<&str> = target_features.split(',').collect();

    let forced_fallback = env::var("AVEL_FORCE_FALLBACK")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let mut tiers = Tier::tiers();
    TierSelector::resolve(&mut tiers, &arch, &target_features);

    // Report host features the target leaves on the table (native builds only)
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    if host == target {
        let names: Vec<&'static str> = tiers.iter().map(|tier| tier.name).collect();
        for name in TierSelector::host_features(&names) {
            let tier = tiers.iter().find(|tier| tier.name == name);
            if let Some(tier) = tier.filter(|tier| !tier.enabled) {
                println!(
                    "host supports {} but the target does not enable it (try -C target-feature=+{})",
                    tier.name, tier.target_feature
                );
            }
        }
    }

    TierSelector::apply(&mut tiers, forced_fallback);

    // Scalar bit scans (bsr/bsf, clz/rbit) exist on every tier-capable architecture,
    // popcount needs POPCNT on x86
    if !forced_fallback {
        if matches!(arch.as_str(), "x86" | "x86_64" | "aarch64") {
            println!("cargo:rustc-cfg=bitscan");
        }
        if arch == "aarch64" || target_features.contains(&"popcnt") {
            println!("cargo:rustc-cfg=hw_popcnt");
        }
    }
}
