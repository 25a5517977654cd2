use crate::error::ApiConfigError;
use minijinja::{context, Environment};

const SWAGGER_UI_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{{ title }}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({
        url: "{{ spec_url|safe }}",
        dom_id: "#swagger-ui",
      });
    };
  </script>
</body>
</html>
"##;

/// Render the Swagger UI page pointing at `spec_url`.
pub fn render_swagger_ui(title: &str, spec_url: &str) -> Result<String, ApiConfigError> {
    let mut env = Environment::new();
    env.add_template("swagger_ui.html", SWAGGER_UI_TEMPLATE)
        .map_err(|e| ApiConfigError::Docs(e.to_string()))?;
    let tmpl = env
        .get_template("swagger_ui.html")
        .map_err(|e| ApiConfigError::Docs(e.to_string()))?;
    tmpl.render(context! { title => title, spec_url => spec_url })
        .map_err(|e| ApiConfigError::Docs(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_points_at_document() {
        let html = render_swagger_ui("Pets", "/api/openapi.json").unwrap();
        assert!(html.contains("<title>Pets</title>"));
        assert!(html.contains(r#"url: "/api/openapi.json""#));
        assert!(html.contains(r##"dom_id: "#swagger-ui""##));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = render_swagger_ui("<b>", "/openapi.json").unwrap();
        assert!(!html.contains("<title><b></title>"));
    }
}
