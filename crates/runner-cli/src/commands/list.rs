//! `list` 서브커맨드: 등록된 전략 목록 출력.

use anyhow::Result;
use runner_strategy::builtin_registry;

/// 내장 레지스트리의 전략 메타데이터를 표 형태로 출력.
pub fn run_list() -> Result<()> {
    let registry = builtin_registry()?;

    println!("등록된 전략 {}개:", registry.len());
    println!("{:<20} {:<20} {:<10} 설명", "키", "이름", "버전");
    println!("{}", "-".repeat(80));

    for key in registry.keys() {
        if let Some(metadata) = registry.metadata(key) {
            println!(
                "{:<20} {:<20} {:<10} {}",
                key, metadata.name, metadata.version, metadata.description
            );
            if !metadata.required_config.is_empty() {
                println!("{:<20} 필수 설정: {}", "", metadata.required_config.join(", "));
            }
        }
    }

    Ok(())
}
