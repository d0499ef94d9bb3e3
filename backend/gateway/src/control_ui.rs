use axum::response::Html;

/// Handler for `GET /ui`. Serves the embedded operator dashboard: an upload
/// widget plus the digitized records table, with client side CSV export and
/// printing. Single file, no build step.
pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>FormLens Dashboard</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; color: #1f2430; }
  h1 { font-size: 1.4rem; }
  .panel { border: 1px solid #d5d9e0; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; }
  button { padding: 0.4rem 0.9rem; border: 1px solid #3b5bdb; border-radius: 6px; background: #3b5bdb; color: #fff; cursor: pointer; }
  button.secondary { background: #fff; color: #3b5bdb; }
  button:disabled { opacity: 0.5; cursor: default; }
  table { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
  th, td { border-bottom: 1px solid #e3e6eb; padding: 0.45rem 0.6rem; text-align: left; }
  th { background: #f4f6f9; }
  #status { margin-left: 0.75rem; font-size: 0.9rem; }
  #status.error { color: #c92a2a; }
  #status.ok { color: #2b8a3e; }
  .toolbar { margin-bottom: 0.75rem; display: flex; gap: 0.5rem; }
  @media print { .panel.upload, .toolbar { display: none; } }
</style>
</head>
<body>
<h1>FormLens &mdash; digitized feedback forms</h1>

<div class="panel upload">
  <input type="file" id="image" accept="image/*">
  <button id="upload">Upload form</button>
  <span id="status"></span>
</div>

<div class="panel">
  <div class="toolbar">
    <button class="secondary" id="refresh">Refresh</button>
    <button class="secondary" id="export">Export CSV</button>
    <button class="secondary" id="print">Print</button>
  </div>
  <table>
    <thead>
      <tr><th>UID</th><th>Program</th><th>Program Date</th><th>Name</th><th>Room No</th><th>Uploaded</th><th>Image</th></tr>
    </thead>
    <tbody id="rows"><tr><td colspan="7">Loading&hellip;</td></tr></tbody>
  </table>
</div>

<script>
let records = [];

function setStatus(text, cls) {
  const el = document.getElementById('status');
  el.textContent = text;
  el.className = cls || '';
}

function cell(value) {
  const td = document.createElement('td');
  td.textContent = value == null ? '' : value;
  return td;
}

function render() {
  const body = document.getElementById('rows');
  body.innerHTML = '';
  if (records.length === 0) {
    const tr = document.createElement('tr');
    const td = cell('No records yet.');
    td.colSpan = 7;
    tr.appendChild(td);
    body.appendChild(tr);
    return;
  }
  for (const r of records) {
    const tr = document.createElement('tr');
    tr.appendChild(cell(r.uid));
    tr.appendChild(cell(r['Program']));
    tr.appendChild(cell(r['Program Date']));
    tr.appendChild(cell(r['Name']));
    tr.appendChild(cell(r['Room No']));
    tr.appendChild(cell(r.uploadedAt));
    const link = document.createElement('td');
    if (r.imageUrl) {
      const a = document.createElement('a');
      a.href = r.imageUrl;
      a.target = '_blank';
      a.textContent = 'open';
      link.appendChild(a);
    }
    tr.appendChild(link);
    body.appendChild(tr);
  }
}

async function refresh() {
  const res = await fetch('/api/feedback');
  if (!res.ok) {
    const body = await res.json().catch(() => ({}));
    setStatus(body.error || 'Failed to fetch feedback', 'error');
    return;
  }
  records = await res.json();
  render();
}

async function upload() {
  const input = document.getElementById('image');
  if (!input.files || input.files.length === 0) {
    setStatus('Choose an image first', 'error');
    return;
  }
  const button = document.getElementById('upload');
  button.disabled = true;
  setStatus('Digitizing…');
  const form = new FormData();
  form.append('image', input.files[0]);
  try {
    const res = await fetch('/api/upload', { method: 'POST', body: form });
    const body = await res.json();
    if (res.ok && body.success) {
      setStatus('Saved ' + body.data.uid, 'ok');
      input.value = '';
      await refresh();
    } else {
      setStatus(body.error || 'Upload failed', 'error');
    }
  } catch (e) {
    setStatus('Upload failed: ' + e, 'error');
  } finally {
    button.disabled = false;
  }
}

function csvField(value) {
  const s = value == null ? '' : String(value);
  return '"' + s.replace(/"/g, '""') + '"';
}

function exportCsv() {
  const header = ['UID', 'Program', 'Program Date', 'Name', 'Room No', 'Image URL'];
  const lines = [header.map(csvField).join(',')];
  for (const r of records) {
    lines.push([r.uid, r['Program'], r['Program Date'], r['Name'], r['Room No'], r.imageUrl]
      .map(csvField).join(','));
  }
  const blob = new Blob([lines.join('\r\n')], { type: 'text/csv' });
  const a = document.createElement('a');
  a.href = URL.createObjectURL(blob);
  a.download = 'feedback.csv';
  a.click();
  URL.revokeObjectURL(a.href);
}

document.getElementById('upload').addEventListener('click', upload);
document.getElementById('refresh').addEventListener('click', refresh);
document.getElementById('export').addEventListener('click', exportCsv);
document.getElementById('print').addEventListener('click', () => window.print());
refresh();
</script>
</body>
</html>
"#;
