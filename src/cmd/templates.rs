pub fn run(name: Option<String>) -> anyhow::Result<()> {
    match name {
        Some(name) => {
            let doc = schema_templates::get(&name).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown template '{}'. Available: {}",
                    name,
                    schema_templates::names().join(", ")
                )
            })?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        None => {
            let width = schema_templates::TEMPLATES
                .iter()
                .map(|t| t.name.len())
                .max()
                .unwrap_or(0);
            for template in schema_templates::TEMPLATES {
                println!("{:width$}  {}", template.name, template.description);
            }
        }
    }
    Ok(())
}
