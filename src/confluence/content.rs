//! Storage-format body written to the destination page.

use html_escape::{encode_double_quoted_attribute, encode_text};

/// Page body embedding the chart attachment, the update time and an info note.
pub fn page_body(project_name: &str, filename: &str, updated_at: &str) -> String {
    format!(
        r#"
<h2>Diagrama de Gantt - {name}</h2>
<p><em>Última actualización: {updated_at}</em></p>
<p> </p>

<ac:image ac:height="600">
  <ri:attachment ri:filename="{filename}" />
</ac:image>

<p> </p>
<p><ac:structured-macro ac:name="info">
  <ac:rich-text-body>
    <p>Sincronizado desde ClickUp API automáticamente (Imagen PNG)</p>
  </ac:rich-text-body>
</ac:structured-macro></p>
"#,
        name = encode_text(project_name),
        updated_at = encode_text(updated_at),
        filename = encode_double_quoted_attribute(filename),
    )
}
