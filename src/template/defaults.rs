// template/defaults.rs

//! Built-in templates written by `payslip init`, and the page scaffold used
//! when authoring a template from a layout workbook.

/// Page scaffold for authored templates. Each `{{Section_Name}}` receives the
/// table rows generated from the matching layout sheet.
pub const SCAFFOLD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { font-family: Arial, sans-serif; font-size: 12px; }
  table { width: 100%; border-collapse: collapse; }
  td { padding: 3px 6px; vertical-align: top; }
  .box { border: 1px solid #000; }
  .half { width: 50%; }
  h2, h3 { text-align: center; margin: 4px 0; }
</style>
</head>
<body>
<h2>{{branch}}</h2>
<h3>Salary slip for {{month}} {{year}}</h3>
<table class="box">
<tr><td>Employee Code:</td><td>{{__id__}}</td></tr>
</table>
<table class="box">
<tr>
<td class="half"><table>
{{Personal_Left}}
</table></td>
<td class="half"><table>
{{Personal_Right}}
</table></td>
</tr>
</table>
<table class="box">
<tr><th>Earnings</th><th>Deductions</th></tr>
<tr>
<td class="half"><table>
{{Earning}}
</table></td>
<td class="half"><table>
{{Deductions}}
</table></td>
</tr>
</table>
<table class="box">
<tr>
<td class="half"><table>
{{Salary_Left}}
</table></td>
<td class="half"><table>
{{Salary_Right}}
</table></td>
</tr>
</table>
<p>This is a computer generated slip and does not require a signature.</p>
</body>
</html>
"#;

pub const TEACHING_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { font-family: Arial, sans-serif; font-size: 12px; }
  table { width: 100%; border-collapse: collapse; }
  td, th { border: 1px solid #000; padding: 3px 6px; }
  h2, h3 { text-align: center; margin: 4px 0; }
</style>
</head>
<body>
<h2>K. J. Somaiya Institute, {{branch}}</h2>
<h3>Salary slip for {{month}} {{year}}</h3>
<table>
<tr><td>Employee Code:</td><td>{{__id__}}</td><td>Name:</td><td>{{name}}</td></tr>
<tr><td>Designation:</td><td>{{designation}}</td><td>Department:</td><td>{{department}}</td></tr>
<tr><td>PAN:</td><td>{{pan}}</td><td>Bank A/c:</td><td>{{bank_account}}</td></tr>
<tr><td>Days Paid:</td><td>{{days_paid}}</td><td>Pay Scale:</td><td>{{pay_scale}}</td></tr>
</table>
<table>
<tr><th colspan="2">Earnings</th><th colspan="2">Deductions</th></tr>
<tr><td>Basic Pay</td><td>{{basic}}</td><td>Provident Fund</td><td>{{pf}}</td></tr>
<tr><td>Dearness Allowance</td><td>{{da}}</td><td>Professional Tax</td><td>{{prof_tax}}</td></tr>
<tr><td>House Rent Allowance</td><td>{{hra}}</td><td>Income Tax</td><td>{{income_tax}}</td></tr>
<tr><td>Travel Allowance</td><td>{{ta}}</td><td>Other Deductions</td><td>{{other_deductions}}</td></tr>
<tr><td>Gross Salary</td><td>{{gross}}</td><td>Total Deductions</td><td>{{total_deductions}}</td></tr>
</table>
<p><b>Net Pay: {{net_pay}}</b></p>
<p>This is a computer generated slip and does not require a signature.</p>
</body>
</html>
"#;

pub const TEACHING_JSON: &str = r#"{
  "name": "Name",
  "designation": "Designation",
  "department": "Department",
  "pan": "PAN",
  "bank_account": "Bank A/C",
  "days_paid": "Days Paid",
  "pay_scale": "Pay Scale",
  "basic": "Basic",
  "da": "DA",
  "hra": "HRA",
  "ta": "TA",
  "gross": "Gross",
  "pf": "PF",
  "prof_tax": "Prof Tax",
  "income_tax": "Income Tax",
  "other_deductions": "Other Ded",
  "total_deductions": "Total Ded",
  "net_pay": "Net"
}
"#;

pub const SVV_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { font-family: Arial, sans-serif; font-size: 12px; }
  table { width: 100%; border-collapse: collapse; }
  td, th { border: 1px solid #000; padding: 3px 6px; }
  h2, h3 { text-align: center; margin: 4px 0; }
</style>
</head>
<body>
<h2>Somaiya Vidyavihar, {{branch}}</h2>
<h3>Pay slip for {{month}} {{year}}</h3>
<table>
<tr><td>Employee Code:</td><td>{{__id__}}</td><td>Name:</td><td>{{name}}</td></tr>
<tr><td>Designation:</td><td>{{designation}}</td><td>Bank A/c:</td><td>{{bank_account}}</td></tr>
</table>
<table>
<tr><th colspan="2">Earnings</th><th colspan="2">Deductions</th></tr>
<tr><td>Basic Pay</td><td>{{basic}}</td><td>Provident Fund</td><td>{{pf}}</td></tr>
<tr><td>Allowances</td><td>{{allowances}}</td><td>Professional Tax</td><td>{{prof_tax}}</td></tr>
<tr><td>Gross Salary</td><td>{{gross}}</td><td>Total Deductions</td><td>{{total_deductions}}</td></tr>
</table>
<p><b>Net Pay: {{net_pay}}</b></p>
</body>
</html>
"#;

pub const SVV_JSON: &str = r#"{
  "name": "Name",
  "designation": "Designation",
  "bank_account": "Bank A/C",
  "basic": "Basic",
  "allowances": "Allowance",
  "gross": "Gross",
  "pf": "PF",
  "prof_tax": "Prof Tax",
  "total_deductions": "Total Ded",
  "net_pay": "Net"
}
"#;

/// Built-in templates by name: `(name, html, json)`.
pub const BUILT_IN: &[(&str, &str, &str)] = &[
    ("teaching", TEACHING_HTML, TEACHING_JSON),
    ("svv", SVV_HTML, SVV_JSON),
];
