pub fn render_index(date: &str) -> String {
    INDEX_HTML.replace("{{DATE}}", date)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="pt">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Dashboard de Contactos</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef4f1;
      --bg-2: #c9e4d8;
      --ink: #23302b;
      --accent: #2f8f6b;
      --accent-2: #2f4858;
      --muted: #6b7570;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e4f0ea 60%, #f4f8f6 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: flex-end;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.25rem;
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.95rem;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 12px;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font: inherit;
      font-size: 0.9rem;
      font-weight: 600;
      cursor: pointer;
      background: transparent;
      color: var(--muted);
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .refresh {
      background: var(--accent-2);
      color: white;
    }

    .toggle {
      display: inline-flex;
      align-items: center;
      gap: 6px;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat, .card {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.8rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .delta {
      font-size: 0.85rem;
      color: var(--muted);
    }

    .delta.up {
      color: var(--accent);
    }

    .delta.down {
      color: #c63b2b;
    }

    .grid-2 {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 16px;
    }

    #trend {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .bars {
      display: grid;
      gap: 10px;
    }

    .bar-row {
      display: grid;
      grid-template-columns: 120px 1fr;
      gap: 10px;
      align-items: center;
      font-size: 0.9rem;
    }

    .bar-name {
      text-transform: capitalize;
      overflow: hidden;
      text-overflow: ellipsis;
      white-space: nowrap;
    }

    .bar-track {
      display: grid;
      gap: 3px;
    }

    .bar {
      height: 12px;
      border-radius: 0 6px 6px 0;
      background: var(--accent);
      min-width: 2px;
      position: relative;
    }

    .bar.previous {
      background: #9fb3bf;
    }

    .bar span {
      position: absolute;
      left: calc(100% + 6px);
      top: -3px;
      font-size: 0.75rem;
      color: var(--muted);
    }

    .legend {
      display: flex;
      gap: 16px;
      font-size: 0.8rem;
      color: var(--muted);
    }

    .legend i {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 2px;
      margin-right: 4px;
      background: var(--accent);
    }

    .legend i.previous {
      background: #9fb3bf;
    }

    .buckets {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
    }

    .buckets li {
      display: flex;
      justify-content: space-between;
      padding: 10px 0;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    .buckets li:last-child {
      border-bottom: none;
    }

    .empty {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .status {
      font-size: 0.95rem;
      color: var(--muted);
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Dashboard</h1>
        <p class="subtitle">Contactos e leads da clínica &middot; <span id="today">{{DATE}}</span></p>
      </div>
      <div class="controls">
        <div class="tabs" role="tablist">
          <button class="tab" type="button" data-period="day">Hoje</button>
          <button class="tab" type="button" data-period="week">Semana</button>
          <button class="tab active" type="button" data-period="month">Mês</button>
          <button class="tab" type="button" data-period="year">Ano</button>
          <button class="tab" type="button" data-period="all">Todos</button>
        </div>
        <label class="toggle"><input id="realtime" type="checkbox" /> Tempo real</label>
        <button class="refresh" id="refresh" type="button">Atualizar</button>
      </div>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Contactos no período</span>
        <span class="value" id="contacts-current">--</span>
        <span class="delta" id="contacts-delta"></span>
      </div>
      <div class="stat">
        <span class="label">Contactos ativos</span>
        <span class="value" id="active">--</span>
        <span class="delta">Contactos não arquivados</span>
      </div>
      <div class="stat">
        <span class="label">Leads no período</span>
        <span class="value" id="leads-current">--</span>
        <span class="delta" id="leads-delta"></span>
      </div>
    </section>

    <section class="card">
      <h2 id="trend-title">Evolução dos registos</h2>
      <svg id="trend" viewBox="0 0 600 260" aria-label="Evolução dos registos" role="img"></svg>
    </section>

    <section class="grid-2">
      <div class="card">
        <h2>Origem dos contactos</h2>
        <div class="legend" data-comparison><span><i></i>Período atual</span><span><i class="previous"></i>Período anterior</span></div>
        <div class="bars" id="origins"></div>
      </div>
      <div class="card">
        <h2>Concelho dos contactos</h2>
        <div class="legend" data-comparison><span><i></i>Período atual</span><span><i class="previous"></i>Período anterior</span></div>
        <div class="bars" id="counties"></div>
      </div>
      <div class="card">
        <h2>Taxa de conversão por origem</h2>
        <div class="legend" data-comparison><span><i></i>Período atual</span><span><i class="previous"></i>Período anterior</span></div>
        <div class="bars" id="conversion"></div>
      </div>
      <div class="card">
        <h2>Estado dos contactos</h2>
        <div class="legend" data-comparison><span><i></i>Período atual</span><span><i class="previous"></i>Período anterior</span></div>
        <div class="bars" id="statuses"></div>
      </div>
      <div class="card">
        <h2>Origem das leads</h2>
        <div class="legend" data-comparison><span><i></i>Período atual</span><span><i class="previous"></i>Período anterior</span></div>
        <div class="bars" id="lead-origins"></div>
      </div>
    </section>

    <section class="card">
      <h2 id="buckets-title">Contactos por período</h2>
      <ul class="buckets" id="buckets"></ul>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const PERIOD_NAMES = {
      day: { noun: 'hoje', previous: 'ontem', buckets: 'Contactos de hoje', trend: 'Registos diários' },
      week: { noun: 'esta semana', previous: 'semana anterior', buckets: 'Contactos por semana', trend: 'Registos semanais' },
      month: { noun: 'este mês', previous: 'mês anterior', buckets: 'Contactos por mês', trend: 'Registos mensais' },
      year: { noun: 'este ano', previous: 'ano anterior', buckets: 'Contactos por ano', trend: 'Registos anuais' },
      all: { noun: 'total', previous: '', buckets: 'Todos os contactos por ano', trend: 'Registos anuais' }
    };

    const statusEl = document.getElementById('status');
    const realtimeEl = document.getElementById('realtime');
    const trendEl = document.getElementById('trend');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    let period = 'month';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[ch]));

    const renderDelta = (el, counts, comparison) => {
      el.classList.remove('up', 'down');
      if (!comparison || counts.previous === null) {
        el.textContent = PERIOD_NAMES[period].noun === 'total' ? 'Total registado' : '';
        return;
      }
      const diff = counts.current - counts.previous;
      const sign = diff > 0 ? '+' : '';
      el.textContent = `${sign}${diff} vs ${PERIOD_NAMES[period].previous} (${counts.previous})`;
      if (diff > 0) el.classList.add('up');
      if (diff < 0) el.classList.add('down');
    };

    const renderBars = (container, rows, comparison, valueOf, suffix = '') => {
      if (!rows.length) {
        container.innerHTML = '<p class="empty">Sem registos neste período.</p>';
        return;
      }
      const max = Math.max(1, ...rows.map((row) => Math.max(valueOf(row, 'current'), valueOf(row, 'previous'))));
      container.innerHTML = rows
        .map((row) => {
          const bar = (side) => {
            const value = valueOf(row, side);
            const width = (value / max) * 85;
            return `<div class="bar ${side === 'previous' ? 'previous' : ''}" style="width:${width}%"><span>${value ? value + suffix : ''}</span></div>`;
          };
          return `<div class="bar-row"><span class="bar-name" title="${escapeHtml(row.category)}">${escapeHtml(row.category)}</span>
            <div class="bar-track">${bar('current')}${comparison ? bar('previous') : ''}</div></div>`;
        })
        .join('');
    };

    const renderTrend = (points) => {
      if (!points.length) {
        trendEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">Sem registos</text>';
        return;
      }

      const width = 600;
      const height = 260;
      const paddingX = 44;
      const paddingY = 34;
      const top = 24;

      const max = Math.max(1, ...points.map((point) => point.count));
      const xStep = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const scaleY = (height - top - paddingY) / max;
      const x = (index) => (points.length > 1 ? paddingX + index * xStep : width / 2);
      const y = (value) => height - paddingY - value * scaleY;

      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.count).toFixed(2)}`)
        .join(' ');

      const ticks = 4;
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = (max * i) / ticks;
        const yPos = y(value);
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${Math.round(value)}</text>`;
      }

      const labelEvery = points.length > 10 ? 3 : 1;
      const xLabels = points
        .map((point, index) =>
          index % labelEvery === 0
            ? `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.label}</text>`
            : ''
        )
        .join('');

      const circles = points
        .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.count)}" r="4"><title>${point.count} registos</title></circle>`)
        .join('');

      trendEl.innerHTML = `${grid}<path class="chart-line" d="${path}" />${circles}${xLabels}`;
    };

    const renderBuckets = (buckets) => {
      const list = document.getElementById('buckets');
      document.getElementById('buckets-title').textContent = PERIOD_NAMES[period].buckets;
      if (!buckets.length) {
        list.innerHTML = '<li class="empty">Nenhum contacto registado neste período.</li>';
        return;
      }
      list.innerHTML = buckets
        .map((bucket) => `<li><strong>${escapeHtml(bucket.label)}</strong><span>${bucket.count} contactos</span></li>`)
        .join('');
    };

    const render = (data) => {
      document.getElementById('contacts-current').textContent = data.contacts.current;
      document.getElementById('leads-current').textContent = data.leads.current;
      document.getElementById('active').textContent = data.active_contacts;
      renderDelta(document.getElementById('contacts-delta'), data.contacts, data.comparison);
      renderDelta(document.getElementById('leads-delta'), data.leads, data.comparison);

      document.querySelectorAll('[data-comparison]').forEach((el) => {
        el.style.display = data.comparison ? '' : 'none';
      });

      const count = (row, side) => row[side];
      const rate = (row, side) => row[side].rate;
      renderBars(document.getElementById('origins'), data.origins, data.comparison, count);
      renderBars(document.getElementById('counties'), data.counties, data.comparison, count);
      renderBars(document.getElementById('conversion'), data.conversion_by_origin, data.comparison, rate, '%');
      renderBars(document.getElementById('statuses'), data.statuses, data.comparison, count);
      renderBars(document.getElementById('lead-origins'), data.lead_origins, data.comparison, count);

      const live = data.realtime ? ' (tempo real)' : '';
      document.getElementById('trend-title').textContent = `${PERIOD_NAMES[period].trend}${live}`;
      renderTrend(data.trend);
      renderBuckets(data.buckets);
    };

    const load = async () => {
      const params = new URLSearchParams({ period, realtime: String(realtimeEl.checked) });
      const res = await fetch(`/api/dashboard?${params}`);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Não foi possível carregar os contactos');
      }
      render(await res.json());
      setStatus('', '');
    };

    const refresh = async () => {
      setStatus('A atualizar...', 'info');
      const res = await fetch('/api/refresh', { method: 'POST' });
      if (!res.ok) {
        throw new Error('Não foi possível atualizar');
      }
      await load();
      setStatus('Atualizado', 'ok');
      setTimeout(() => setStatus('', ''), 1200);
    };

    const setPeriod = (next) => {
      period = next;
      tabs.forEach((button) => button.classList.toggle('active', button.dataset.period === next));
      load().catch((err) => setStatus(err.message, 'error'));
    };

    tabs.forEach((button) => button.addEventListener('click', () => setPeriod(button.dataset.period)));
    realtimeEl.addEventListener('change', () => load().catch((err) => setStatus(err.message, 'error')));
    document.getElementById('refresh').addEventListener('click', () => refresh().catch((err) => setStatus(err.message, 'error')));

    setStatus('A carregar contactos...', 'info');
    load().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_embeds_date_and_period_tabs() {
        let html = render_index("2024-03-15");
        assert!(html.contains("2024-03-15"));
        assert!(!html.contains("{{DATE}}"));
        for period in ["day", "week", "month", "year", "all"] {
            assert!(html.contains(&format!("data-period=\"{period}\"")));
        }
    }
}
