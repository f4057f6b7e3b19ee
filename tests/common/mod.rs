#![allow(dead_code)]

use std::path::Path;

use scraper::{ElementRef, Html, Selector};

pub const SCENARIO_ROWSPAN: &str = r#"
<table id="t"><tr><td rowspan="2">A</td><td>B</td></tr><tr><td>C</td></tr></table>"#;

pub const SCENARIO_COLSPAN_LINK: &str = r#"
<table id="t">
  <tr><th colspan="2">Header</th></tr>
  <tr><td>X</td><td><a href="https://x">Y</a></td></tr>
</table>"#;

/// Column 1 is hidden in every row; a merge and a link sit to its right.
pub const HIDDEN_COLUMN: &str = r#"
<table id="t">
  <tr><td>a</td><td style="display:none">h</td><td colspan="2">wide</td></tr>
  <tr><td>b</td><td style="display: none">h</td><td><a href="https://l">L</a></td><td>z</td></tr>
</table>"#;

/// Element Plus renders the selection column as `is-hidden` shadow cells.
pub const ELEMENT_PLUS: &str = r#"
<div class="el-table" id="root">
  <div class="el-table__header-wrapper">
    <table class="el-table__header"><thead>
      <tr><th class="is-hidden">Sel</th><th>Name</th><th>Age</th></tr>
    </thead></table>
  </div>
  <div class="el-table__body-wrapper">
    <table class="el-table__body"><tbody>
      <tr><td class="is-hidden">x</td><td><a href="/u/1">Ann</a></td><td>30</td></tr>
      <tr><td class="is-hidden">x</td><td>Bob</td><td><button id="cell-button">41</button></td></tr>
    </tbody></table>
  </div>
</div>"#;

pub const ANT_DESIGN: &str = r#"
<div class="ant-table" id="root">
  <div class="ant-table-container" id="wrap">
    <div class="ant-table-fixed-left">
      <div class="ant-table-header"><table><thead><tr><th>ID</th></tr></thead></table></div>
      <div class="ant-table-body"><table><tbody><tr><td>1</td></tr><tr><td>2</td></tr></tbody></table></div>
    </div>
    <div class="ant-table-header"><table><thead><tr><th>Name</th><th>City</th></tr></thead></table></div>
    <div class="ant-table-body"><table><tbody>
      <tr><td>Ann</td><td>Oslo</td></tr>
      <tr><td>Bob</td><td>Rome</td></tr>
    </tbody></table></div>
    <div class="ant-table-fixed-right">
      <div class="ant-table-header"><table><thead><tr><th>Op</th></tr></thead></table></div>
      <div class="ant-table-body"><table><tbody>
        <tr><td><a href="/edit/1">Edit</a></td></tr>
        <tr><td><a href="JavaScript:void(0)">Edit</a></td></tr>
      </tbody></table></div>
    </div>
  </div>
</div>"#;

pub const NAIVE_UI_SPLIT: &str = r#"
<div class="n-data-table" id="root">
  <div class="n-data-table-base-table-header"><table><thead><tr><th>K</th><th>V</th></tr></thead></table></div>
  <div class="n-data-table-base-table-body"><table><tbody><tr><td>a</td><td>1</td></tr></tbody></table></div>
</div>"#;

/// One combined table must be read once, not as both header and body.
pub const NAIVE_UI_SINGLE: &str = r#"
<div class="n-data-table" id="root">
  <table><thead><tr><th>K</th><th>V</th></tr></thead><tbody><tr><td>a</td><td>1</td></tr></tbody></table>
</div>"#;

pub const VIEW_UI: &str = r#"
<div class="ivu-table-wrapper"><div class="ivu-table" id="root">
  <div class="ivu-table-header"><table><thead><tr><th colspan="2">Person</th></tr></thead></table></div>
  <div class="ivu-table-body"><table><tbody><tr><td>Ann</td><td>30</td></tr></tbody></table></div>
</div></div>"#;

pub const ARCO: &str = r#"
<div class="arco-table" id="root">
  <div class="arco-table-container" id="wrap">
    <div class="arco-table-header"><table><thead><tr><th>H1</th><th>H2</th></tr></thead></table></div>
    <div class="arco-table-body"><table><tbody>
      <tr><td rowspan="2">g</td><td>1</td></tr>
      <tr><td>2</td></tr>
    </tbody></table></div>
  </div>
</div>"#;

pub const TDESIGN: &str = r#"
<div class="t-table" id="root">
  <div class="t-table__content" id="wrap">
    <div class="t-table__header"><table><thead><tr><th>Code</th><th>Qty</th></tr></thead></table></div>
    <div class="t-table__body"><table><tbody>
      <tr><td>A-1</td><td>3</td></tr>
      <tr><td>B-2</td></tr>
    </tbody></table></div>
  </div>
</div>"#;

pub const NO_TABLES: &str = "<html><head><title>Empty</title></head><body><p>none</p></body></html>";

pub fn parse(markup: &str) -> Html {
    Html::parse_document(markup)
}

pub fn by_css<'a>(html: &'a Html, css: &str) -> ElementRef<'a> {
    let selector = Selector::parse(css).expect("fixture selector should parse");
    html.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("fixture should contain {css}"))
}

pub fn write_page(path: &Path, body: &str) {
    let markup = format!("<!doctype html><html><head><title>Fixture page</title></head><body>{body}</body></html>");
    std::fs::write(path, markup).expect("fixture page should be written");
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(ToString::to_string).collect()
}
