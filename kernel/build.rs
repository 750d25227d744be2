//! Rux 同步原语构建脚本
//!
//! 这个脚本在编译前运行，负责：
//! 1. 解析 Kernel.toml（或 menuconfig 生成的 build/.config）
//! 2. 生成 src/config.rs 中的同步原语常量

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// 条件变量等待者上限的默认值
const DEFAULT_CV_MAX_WAITERS: i64 = 64;
/// 等待通道预留槽位的默认值
const DEFAULT_WCHAN_QUEUE_RESERVE: i64 = 4;

/// 解析 build/.config 文件（简单 key=value 格式，例如 `sync_cv_max_waiters=64`）
fn parse_dot_config(content: &str) -> toml::Value {
    let mut sections: HashMap<String, toml::map::Map<String, toml::Value>> = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // 跳过注释和空行
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        // 第一个下划线之前是 section 名
        let Some((section, config_key)) = key.trim().split_once('_') else {
            continue;
        };

        let parsed_value = if value == "true" {
            toml::Value::Boolean(true)
        } else if value == "false" {
            toml::Value::Boolean(false)
        } else if let Ok(int_val) = value.parse::<i64>() {
            toml::Value::Integer(int_val)
        } else {
            toml::Value::String(value.to_string())
        };

        sections
            .entry(section.to_string())
            .or_default()
            .insert(config_key.to_string(), parsed_value);
    }

    let mut root_map = toml::map::Map::new();
    for (section_name, section_data) in sections {
        root_map.insert(section_name, toml::Value::Table(section_data));
    }
    toml::Value::Table(root_map)
}

/// 读取 `[section] key` 形式的正整数，缺失或非法时回退到默认值
fn positive_int(config: &toml::Value, section: &str, key: &str, default: i64) -> i64 {
    match config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
    {
        Some(v) if v > 0 => v,
        Some(v) => {
            println!("cargo:warning={}.{} = {} is not positive, using {}", section, key, v, default);
            default
        }
        None => default,
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../Kernel.toml");
    println!("cargo:rerun-if-changed=../build/.config");

    // 优先使用 build/.config（menuconfig 生成的配置），其次 Kernel.toml
    let config = if let Ok(content) = fs::read_to_string("../build/.config") {
        println!("cargo:warning=Using build/.config configuration");
        parse_dot_config(&content)
    } else if let Ok(content) = fs::read_to_string("../Kernel.toml") {
        match toml::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                println!("cargo:warning=Kernel.toml parse error ({}), using defaults", e);
                toml::Value::Table(toml::map::Map::new())
            }
        }
    } else {
        toml::Value::Table(toml::map::Map::new())
    };

    generate_config_code(&config);
}

fn generate_config_code(config: &toml::Value) {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    let cv_max_waiters = positive_int(config, "sync", "cv_max_waiters", DEFAULT_CV_MAX_WAITERS);
    let wchan_queue_reserve =
        positive_int(config, "sync", "wchan_queue_reserve", DEFAULT_WCHAN_QUEUE_RESERVE);

    let config_header = format!(
        r#"//! Rux 同步原语配置（自动生成）
//!
//! 此文件由 build.rs 根据 Kernel.toml 自动生成，请勿手动修改

// ============================================================
// 同步原语配置
// ============================================================

/// 条件变量同时记录的等待者上限
pub const CV_MAX_WAITERS: usize = {};

/// 每个等待通道创建时预留的睡眠者槽位
pub const WCHAN_QUEUE_RESERVE: usize = {};
"#,
        cv_max_waiters, wchan_queue_reserve,
    );

    let config_file = manifest_dir.join("src").join("config.rs");

    // 只有内容变化时才写入，避免每次编译都更新文件时间戳
    let existing_content = fs::read_to_string(&config_file).unwrap_or_default();
    if existing_content != config_header {
        fs::write(&config_file, &config_header).expect("写入配置文件失败");
    }
}
